//! Runs short-lived external tools under a timeout.

use std::ffi::OsStr;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use crate::error::ToolError;

/// Captured output of a successful tool run.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Run `program` with `args`, failing if it exits non-zero or runs past `limit`.
///
/// `tool` is the human-facing name used in errors. The process is killed if
/// the timeout fires.
pub async fn run_tool<I, S>(
    tool: &str,
    program: impl AsRef<OsStr>,
    args: I,
    limit: Duration,
) -> Result<ToolOutput, ToolError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(program.as_ref());
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    debug!(tool, command = ?cmd.as_std(), "Running tool");

    let child = cmd.spawn().map_err(|e| ToolError::from_spawn(tool, e))?;

    let output = match tokio::time::timeout(limit, child.wait_with_output()).await {
        Ok(result) => result.map_err(|source| ToolError::Io {
            tool: tool.to_string(),
            source,
        })?,
        // Dropping the future drops the child, which kills it
        Err(_) => {
            return Err(ToolError::TimedOut {
                tool: tool.to_string(),
                secs: limit.as_secs(),
            });
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

    if !output.status.success() {
        return Err(ToolError::Failed {
            tool: tool.to_string(),
            code: output.status.code(),
            stderr,
        });
    }

    Ok(ToolOutput { stdout, stderr })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_secs(1);

    #[tokio::test]
    async fn missing_program_is_not_found() {
        let err = run_tool("ffprobe", "/nonexistent/voxkit/ffprobe", ["-v"], SECOND)
            .await
            .unwrap_err();
        assert!(err.is_not_found(), "{err:?}");
    }

    #[tokio::test]
    async fn non_zero_exit_is_failed_with_stderr() {
        let err = run_tool("sh", "sh", ["-c", "echo broken >&2; exit 3"], SECOND)
            .await
            .unwrap_err();
        match err {
            ToolError::Failed { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "broken");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_program_times_out() {
        let err = run_tool("sleep", "sleep", ["5"], Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::TimedOut { .. }));
    }

    #[tokio::test]
    async fn captures_stdout() {
        let out = run_tool("echo", "echo", ["12.5"], SECOND).await.unwrap();
        assert_eq!(out.stdout.trim(), "12.5");
    }
}
