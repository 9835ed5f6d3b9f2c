//! Transport envelope returned to the UI layer.
//!
//! Every public operation yields a `Result`; adapters that speak JSON wrap it
//! in [`CommandResult`] so the caller always sees `{ success, data?, error? }`
//! with a human-readable message instead of an exception.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> CommandResult<T> {
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for CommandResult<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::err(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_serializes_without_data() {
        let result: CommandResult<String> = Err::<String, _>("No voices installed").into();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "success": false, "error": "No voices installed" })
        );
    }

    #[test]
    fn success_carries_data() {
        let result: CommandResult<u32> = Ok::<_, String>(7).into();
        assert!(result.success);
        assert_eq!(result.data, Some(7));
        assert!(result.error.is_none());
    }
}
