//! Persisted voice settings.
//!
//! Settings live in `<data_root>/settings.json`. All fields are optional so
//! older files keep loading as new fields are added; effective values fall
//! back to the defaults below.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default catalog cache lifetime.
pub const DEFAULT_CATALOG_TTL_SECS: u64 = 600;

/// Default speech speed multiplier.
pub const DEFAULT_SPEECH_SPEED: f32 = 1.0;

/// Default interpreter for the XTTS inference server.
pub const DEFAULT_XTTS_PROGRAM: &str = "python3";

/// Application settings structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Piper voice used when a request does not name one.
    pub selected_voice: Option<String>,

    /// Speech speed multiplier (1.0 = normal, 2.0 = twice as fast).
    pub speech_speed: Option<f32>,

    /// Whisper model used for transcription.
    pub selected_whisper_model: Option<String>,

    /// Explicit path to the whisper.cpp CLI binary.
    pub whisper_cli_path: Option<String>,

    /// Interpreter launching the XTTS inference server.
    pub xtts_server_program: Option<String>,

    /// Script passed to the XTTS interpreter.
    pub xtts_server_script: Option<String>,

    /// Override for the remote voice catalog URL.
    pub catalog_url: Option<String>,

    /// Catalog cache lifetime in seconds.
    pub catalog_ttl_secs: Option<u64>,
}

impl Settings {
    /// Get the effective speech speed (with default fallback).
    #[must_use]
    pub fn effective_speed(&self) -> f32 {
        self.speech_speed.unwrap_or(DEFAULT_SPEECH_SPEED)
    }

    /// Get the effective catalog TTL (with default fallback).
    #[must_use]
    pub fn catalog_ttl(&self) -> Duration {
        Duration::from_secs(self.catalog_ttl_secs.unwrap_or(DEFAULT_CATALOG_TTL_SECS))
    }

    /// Get the effective XTTS interpreter.
    #[must_use]
    pub fn xtts_program(&self) -> &str {
        self.xtts_server_program
            .as_deref()
            .unwrap_or(DEFAULT_XTTS_PROGRAM)
    }

    /// Merge another settings into this one, only updating fields that are Some.
    pub fn merge(&mut self, other: &SettingsUpdate) {
        if let Some(ref voice) = other.selected_voice {
            self.selected_voice.clone_from(voice);
        }
        if let Some(speed) = other.speech_speed {
            self.speech_speed = speed;
        }
        if let Some(ref model) = other.selected_whisper_model {
            self.selected_whisper_model.clone_from(model);
        }
        if let Some(ref path) = other.whisper_cli_path {
            self.whisper_cli_path.clone_from(path);
        }
        if let Some(ref program) = other.xtts_server_program {
            self.xtts_server_program.clone_from(program);
        }
        if let Some(ref script) = other.xtts_server_script {
            self.xtts_server_script.clone_from(script);
        }
        if let Some(ref url) = other.catalog_url {
            self.catalog_url.clone_from(url);
        }
        if let Some(ttl) = other.catalog_ttl_secs {
            self.catalog_ttl_secs = ttl;
        }
    }
}

/// Partial settings update.
///
/// Each field is `Option<Option<T>>`:
/// - `None` = don't change this field
/// - `Some(None)` = set field to None/null
/// - `Some(Some(value))` = set field to value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub selected_voice: Option<Option<String>>,
    pub speech_speed: Option<Option<f32>>,
    pub selected_whisper_model: Option<Option<String>>,
    pub whisper_cli_path: Option<Option<String>>,
    pub xtts_server_program: Option<Option<String>>,
    pub xtts_server_script: Option<Option<String>>,
    pub catalog_url: Option<Option<String>>,
    pub catalog_ttl_secs: Option<Option<u64>>,
}

/// Settings validation and persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Speech speed must be between 0.1 and 10.0, got {0}")]
    InvalidSpeed(f32),

    #[error("Catalog TTL must be at least 1 second")]
    InvalidCatalogTtl,

    #[error("Failed to read settings {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write settings {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Settings file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Validate a settings update before applying it.
pub fn validate_settings(update: &SettingsUpdate) -> Result<(), SettingsError> {
    if let Some(Some(speed)) = update.speech_speed {
        if !(0.1..=10.0).contains(&speed) {
            return Err(SettingsError::InvalidSpeed(speed));
        }
    }
    if let Some(Some(0)) = update.catalog_ttl_secs {
        return Err(SettingsError::InvalidCatalogTtl);
    }
    Ok(())
}

/// Reads and writes `settings.json` wholesale.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings; a missing file yields defaults.
    pub fn load(&self) -> Result<Settings, SettingsError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No settings file, using defaults");
                return Ok(Settings::default());
            }
            Err(source) => {
                return Err(SettingsError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_str(&raw).map_err(|source| SettingsError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Persist settings, creating the parent directory if needed.
    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let write_err = |source| SettingsError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(settings).map_err(|source| SettingsError::Parse {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json).map_err(write_err)
    }

    /// Validate, merge and persist an update. Returns the new settings.
    pub fn update(&self, update: &SettingsUpdate) -> Result<Settings, SettingsError> {
        validate_settings(update)?;
        let mut settings = self.load()?;
        settings.merge(update);
        self.save(&settings)?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(tmp.path().join("settings.json"));
        let settings = store.load().unwrap();
        assert_eq!(settings, Settings::default());
        assert!((settings.effective_speed() - 1.0).abs() < f32::EPSILON);
        assert_eq!(settings.catalog_ttl(), Duration::from_secs(600));
        assert_eq!(settings.xtts_program(), "python3");
    }

    #[test]
    fn update_round_trips_through_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(tmp.path().join("nested").join("settings.json"));

        let update = SettingsUpdate {
            selected_voice: Some(Some("en_US-amy-medium".to_string())),
            speech_speed: Some(Some(1.5)),
            ..Default::default()
        };
        store.update(&update).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.selected_voice.as_deref(), Some("en_US-amy-medium"));
        assert_eq!(loaded.speech_speed, Some(1.5));

        let clear = SettingsUpdate {
            selected_voice: Some(None),
            ..Default::default()
        };
        let cleared = store.update(&clear).unwrap();
        assert!(cleared.selected_voice.is_none());
        assert_eq!(cleared.speech_speed, Some(1.5));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("settings.json");
        fs::write(&path, r#"{"selected_voice":"x","legacy_flag":true}"#).unwrap();
        let settings = SettingsStore::new(&path).load().unwrap();
        assert_eq!(settings.selected_voice.as_deref(), Some("x"));
    }

    #[test]
    fn rejects_out_of_range_speed() {
        let update = SettingsUpdate {
            speech_speed: Some(Some(0.0)),
            ..Default::default()
        };
        assert!(matches!(
            validate_settings(&update),
            Err(SettingsError::InvalidSpeed(_))
        ));
    }

    #[test]
    fn corrupt_file_is_a_parse_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            SettingsStore::new(&path).load(),
            Err(SettingsError::Parse { .. })
        ));
    }
}
