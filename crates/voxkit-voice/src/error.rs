//! Error types for the voice catalog and the installed-voice library.

use std::path::PathBuf;

use voxkit_download::DownloadError;

/// Errors from the remote voice catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The manifest could not be downloaded or parsed.
    #[error("Failed to fetch voice catalog: {0}")]
    Fetch(#[from] DownloadError),

    /// No catalog has ever been fetched and the latest attempt failed.
    #[error("Voice catalog unavailable: {0}")]
    Unavailable(String),

    /// The requested key (or alias) is not listed.
    #[error("Voice '{0}' is not in the catalog")]
    UnknownVoice(String),
}

/// Errors from voice discovery, resolution and import.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    /// Nothing is installed in any namespace, so there is nothing to fall back to.
    #[error("No voices installed")]
    NoVoicesInstalled,

    /// The voice key is not installed where the operation expected it.
    #[error("Voice '{0}' is not installed")]
    NotFound(String),

    /// The key cannot be used as a file name.
    #[error("Invalid voice key '{0}'")]
    InvalidKey(String),

    /// Imported file does not have the `.onnx` extension.
    #[error("Not a Piper voice model (expected .onnx): {0}")]
    NotAModel(PathBuf),

    /// Imported model has no `<model>.onnx.json` next to it.
    #[error("Voice config not found: {0}")]
    MissingConfig(PathBuf),

    /// Filesystem failure.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The custom voice metadata sidecar is malformed.
    #[error("Invalid custom voice metadata at {path}: {source}")]
    Metadata {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl LibraryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
