//! `--json` output wrapped in the `{ success, data?, error? }` envelope.

use std::fmt::Display;

use serde::Serialize;
use voxkit_core::CommandResult;

pub fn json_envelope<T: Serialize, E: Display>(
    result: Result<T, E>,
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&CommandResult::from(result))
}

/// Print the envelope on stdout; a failed result still exits non-zero.
pub fn print_json<T: Serialize, E: Display>(result: Result<T, E>) -> anyhow::Result<()> {
    let failure = result.as_ref().err().map(ToString::to_string);
    println!("{}", json_envelope(result)?);
    match failure {
        Some(message) => Err(anyhow::anyhow!(message)),
        None => Ok(()),
    }
}
