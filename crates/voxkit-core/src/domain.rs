//! Voice asset domain types shared by every voxkit crate.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Namespace an installed voice was discovered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceSource {
    /// Shipped with the application.
    Builtin,
    /// Downloaded from the remote catalog.
    Downloaded,
    /// Imported by the user.
    Custom,
}

impl fmt::Display for VoiceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Builtin => "builtin",
            Self::Downloaded => "downloaded",
            Self::Custom => "custom",
        };
        f.write_str(s)
    }
}

/// A voice whose model and config are both present on disk.
///
/// Recomputed by scanning the filesystem on every discovery call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledVoice {
    pub key: String,
    pub name: String,
    pub source: VoiceSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Resolved model/config locations for a single voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoicePaths {
    pub model: PathBuf,
    pub config: PathBuf,
}

impl VoicePaths {
    /// Whether both files currently exist.
    pub fn exist(&self) -> bool {
        self.model.is_file() && self.config.is_file()
    }
}

/// Installation state of an engine binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStatus {
    pub installed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Installation state of a family of models (synthesis voices or
/// transcription models). Computed on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelStatus {
    pub installed: bool,
    pub available: Vec<String>,
    pub selected: Option<String>,
}
