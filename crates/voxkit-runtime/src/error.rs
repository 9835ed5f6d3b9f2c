//! Error types for installers, engine processes and external tools.

use std::path::PathBuf;

use voxkit_core::SettingsError;
use voxkit_download::{ArchiveError, DownloadError};
use voxkit_voice::{CatalogError, LibraryError};

/// Failure of an external command-line tool (ffprobe, ffmpeg, whisper-cli,
/// the inference server).
///
/// The variant is decided from the spawn/wait result itself, so callers can
/// branch on "not installed" without inspecting messages.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The executable does not exist.
    #[error("{tool} not found. Install it and make sure it is on your PATH")]
    NotFound { tool: String },

    /// The process ran and exited unsuccessfully.
    #[error("{tool} failed{}: {stderr}", exit_suffix(.code))]
    Failed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The process did not finish in time and was killed.
    #[error("{tool} timed out after {secs}s")]
    TimedOut { tool: String, secs: u64 },

    /// Any other spawn or I/O failure.
    #[error("Failed to run {tool}: {source}")]
    Io {
        tool: String,
        source: std::io::Error,
    },
}

#[allow(clippy::ref_option)]
fn exit_suffix(code: &Option<i32>) -> String {
    code.map_or_else(|| " (killed by signal)".to_string(), |c| format!(" (exit code {c})"))
}

impl ToolError {
    /// Classify a spawn error.
    pub fn from_spawn(tool: impl Into<String>, source: std::io::Error) -> Self {
        let tool = tool.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound { tool }
        } else {
            Self::Io { tool, source }
        }
    }

    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors from the engine and asset installers.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    #[error("Unsupported platform '{0}'. Supported: linux-x86_64, linux-aarch64, linux-armv7l, macos-x86_64, macos-aarch64, windows-x86_64")]
    UnsupportedPlatform(String),

    #[error("Download failed: {0}")]
    Download(#[from] DownloadError),

    #[error("Extraction failed: {0}")]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Invalid asset key '{0}'")]
    InvalidKey(String),

    #[error("Catalog entry for '{0}' does not list a model and config file")]
    IncompleteEntry(String),

    #[error("Unknown transcription model '{0}'")]
    UnknownModel(String),

    #[error("Size mismatch for {path}: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    #[error("Installation finished but {0} was not found afterwards")]
    VerificationFailed(String),

    #[error("'{0}' is not installed")]
    NotInstalled(String),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl InstallError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors from Piper synthesis.
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("Nothing to speak: text is empty")]
    EmptyText,

    #[error("Speech speed must be a positive number, got {0}")]
    InvalidSpeed(f32),

    #[error(transparent)]
    Voice(#[from] LibraryError),

    #[error("Piper is not installed. Run `voxkit piper install` first")]
    EngineNotInstalled,

    #[error("Failed to start Piper at {path}: {source}")]
    Spawn {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Piper failed{}: {stderr}", exit_suffix(.code))]
    Failed { code: Option<i32>, stderr: String },

    #[error("Piper produced no audio{}: {stderr}", exit_suffix(.code))]
    NoOutput { code: Option<i32>, stderr: String },

    #[error("Speech was stopped")]
    Stopped,

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Errors from the voice-clone pipeline.
#[derive(Debug, thiserror::Error)]
pub enum CloneError {
    #[error("Reference audio not found: {0}")]
    ReferenceNotFound(PathBuf),

    #[error("Voice name must contain at least one letter or digit")]
    InvalidName,

    #[error("Cloned voice '{0}' not found")]
    NotFound(String),

    #[error("Clip must be at least {min} seconds long, got {actual:.1}s")]
    ClipTooShort { min: f64, actual: f64 },

    #[error("Clip must be at most {max} seconds long, got {actual:.1}s")]
    ClipTooLong { max: f64, actual: f64 },

    #[error("Invalid clip range {start:.1}s to {end:.1}s")]
    InvalidRange { start: f64, end: f64 },

    #[error("Clip ends at {end:.1}s but the media is only {duration:.1}s long")]
    ClipOutOfRange { end: f64, duration: f64 },

    #[error("Could not read media duration from ffprobe output '{0}'")]
    BadDuration(String),

    #[error("Unknown sample voice '{0}'")]
    UnknownSample(String),

    #[error("Nothing to speak: text is empty")]
    EmptyText,

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("Voice synthesis failed: {0}")]
    Synthesis(String),

    #[error("Inference server protocol error: {0}")]
    Protocol(String),

    #[error("Inference server exited unexpectedly")]
    ServerExited,

    #[error("Download failed: {0}")]
    Download(#[from] DownloadError),

    #[error("Invalid voice metadata at {path}: {source}")]
    Metadata {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl CloneError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors from whisper.cpp transcription.
#[derive(Debug, thiserror::Error)]
pub enum TranscribeError {
    #[error("Audio file not found: {0}")]
    AudioNotFound(PathBuf),

    #[error("Transcription model '{0}' is not installed")]
    ModelNotInstalled(String),

    #[error(transparent)]
    Tool(#[from] ToolError),
}
