//! Path utilities for voxkit asset directories.
//!
//! This module provides the canonical path resolution for all voxkit
//! components:
//! - Piper engine binaries and voices (bundled, downloaded, custom)
//! - Whisper transcription models
//! - XTTS cloned voices
//! - Settings and log files
//!
//! # Design
//!
//! - Returns `PathBuf` and `PathError` for clear error handling
//! - Path derivation is pure; directory creation is an explicit, separate step

mod assets;
mod ensure;
mod error;
mod platform;

pub use assets::{
    AssetPaths, CUSTOM_METADATA_FILE, VOICE_MODEL_EXT, XTTS_METADATA_FILE, XTTS_REFERENCE_FILE,
    is_valid_asset_key, voice_files,
};
pub use ensure::{ensure_directory, verify_writable};
pub use error::PathError;
pub use platform::{DATA_DIR_ENV, RESOURCE_DIR_ENV, data_root, resource_root};
