//! Error types for downloads and archive extraction.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while fetching a URL.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// A URL (initial or from a `Location` header) could not be parsed.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Connection, TLS, or body transfer failure.
    #[error("Network error fetching {url}: {source}")]
    Network {
        url: String,
        source: reqwest::Error,
    },

    /// Non-2xx, non-redirect response.
    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    /// Redirect status without a `Location` header.
    #[error("Redirect (HTTP {status}) from {url} has no Location header")]
    MissingLocation { url: String, status: u16 },

    /// The redirect chain exceeded the hop limit.
    #[error("Too many redirects (more than {max}) starting at {url}")]
    TooManyRedirects { url: String, max: usize },

    /// The body ended before the declared content length.
    #[error("Download of {url} ended after {received} of {expected} bytes")]
    Incomplete {
        url: String,
        received: u64,
        expected: u64,
    },

    /// Writing the destination file failed.
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The response body was not the expected JSON document.
    #[error("Invalid JSON from {url}: {source}")]
    Json {
        url: String,
        source: serde_json::Error,
    },
}

impl DownloadError {
    /// HTTP status carried by this error, if any.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } | Self::MissingLocation { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors that can occur while expanding an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The file extension is not a supported archive type.
    #[error("Unsupported archive format: {0}")]
    UnsupportedFormat(PathBuf),

    /// Reading the archive or writing its contents failed.
    #[error("Failed to extract {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The archive is malformed.
    #[error("Corrupt archive {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// Extraction did not finish within the allowed time.
    #[error("Extraction of {path} timed out after {secs}s")]
    TimedOut { path: PathBuf, secs: u64 },

    /// The blocking extraction task panicked or was cancelled.
    #[error("Extraction task failed: {0}")]
    Join(String),
}
