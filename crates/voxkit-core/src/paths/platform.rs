//! Root directory detection.
//!
//! Everything voxkit writes lives under a single data root. Built-in voices
//! shipped with the application live under a separate, read-only resource
//! root.

use std::env;
use std::path::PathBuf;

use super::error::PathError;

/// Environment variable overriding the data root.
pub const DATA_DIR_ENV: &str = "VOXKIT_DATA_DIR";

/// Environment variable overriding the bundled resource root.
pub const RESOURCE_DIR_ENV: &str = "VOXKIT_RESOURCE_DIR";

/// Get the root directory for all managed assets.
///
/// Resolution order:
/// 1. `VOXKIT_DATA_DIR` environment variable (highest priority)
/// 2. System data directory (e.g., `~/.local/share/voxkit`)
///
/// The directory is not created here; see [`super::ensure_directory`].
pub fn data_root() -> Result<PathBuf, PathError> {
    if let Ok(path) = env::var(DATA_DIR_ENV) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    let data_dir = dirs::data_local_dir().ok_or(PathError::NoDataDir)?;
    Ok(data_dir.join("voxkit"))
}

/// Get the root directory for resources bundled with the application.
///
/// Resolution order:
/// 1. `VOXKIT_RESOURCE_DIR` environment variable
/// 2. `<data_root>/bundled`
pub fn resource_root() -> Result<PathBuf, PathError> {
    if let Ok(path) = env::var(RESOURCE_DIR_ENV) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    Ok(data_root()?.join("bundled"))
}
