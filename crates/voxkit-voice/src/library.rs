//! Installed-voice discovery and the resolution cascade.
//!
//! Three namespaces are scanned, in order:
//!
//! 1. known voices from [`BUILTIN_VOICES`], reported as `builtin` when found
//!    in the bundled directory and `downloaded` when found in the download
//!    directory
//! 2. any other `<key>.onnx` + `<key>.onnx.json` pair in the download directory
//! 3. user-imported voices, addressed as `custom:<base name>`
//!
//! A voice is installed only while both of its files exist. Nothing is
//! cached; every call re-reads the filesystem.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info, warn};
use voxkit_core::paths::{VOICE_MODEL_EXT, is_valid_asset_key, voice_files};
use voxkit_core::{AssetPaths, FilePicker, InstalledVoice, VoicePaths, VoiceSource};

use crate::builtin::{BUILTIN_VOICES, parse_voice_key};
use crate::error::LibraryError;

/// Key prefix addressing the user-imported namespace.
pub const CUSTOM_PREFIX: &str = "custom:";

/// A voice key together with the files it resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVoice {
    pub key: String,
    pub paths: VoicePaths,
}

/// On-disk shape of `custom-voices.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomVoiceMetadata {
    #[serde(default)]
    pub voices: BTreeMap<String, CustomVoiceEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomVoiceEntry {
    pub display_name: String,
    pub added_at: String,
}

/// Discovers, resolves and manages installed Piper voices.
#[derive(Debug, Clone)]
pub struct VoiceLibrary {
    paths: AssetPaths,
}

impl VoiceLibrary {
    pub const fn new(paths: AssetPaths) -> Self {
        Self { paths }
    }

    pub const fn paths(&self) -> &AssetPaths {
        &self.paths
    }

    // ── Discovery ──────────────────────────────────────────────────

    /// List every installed voice in scan order.
    pub async fn list_installed(&self) -> Result<Vec<InstalledVoice>, LibraryError> {
        let bundled_dir = self.paths.bundled_voices_dir();
        let downloaded_dir = self.paths.downloaded_voices_dir();
        let mut voices = Vec::new();
        let mut seen = HashSet::new();

        for builtin in BUILTIN_VOICES {
            let source = if is_installed_in(&bundled_dir, builtin.key).await {
                VoiceSource::Builtin
            } else if is_installed_in(&downloaded_dir, builtin.key).await {
                VoiceSource::Downloaded
            } else {
                continue;
            };
            let (language, quality) = parse_voice_key(builtin.key);
            seen.insert(builtin.key.to_string());
            voices.push(InstalledVoice {
                key: builtin.key.to_string(),
                name: builtin.name.to_string(),
                source,
                quality,
                language,
            });
        }

        for key in scan_voice_dir(&downloaded_dir).await? {
            if seen.contains(&key) {
                continue;
            }
            let (language, quality) = parse_voice_key(&key);
            voices.push(InstalledVoice {
                name: key.clone(),
                key,
                source: VoiceSource::Downloaded,
                quality,
                language,
            });
        }

        let custom_dir = self.paths.custom_voices_dir();
        let custom = scan_voice_dir(&custom_dir).await?;
        if !custom.is_empty() {
            let metadata = self.read_metadata().await.unwrap_or_else(|e| {
                warn!(error = %e, "Ignoring unreadable custom voice metadata");
                CustomVoiceMetadata::default()
            });
            for base in custom {
                let name = metadata
                    .voices
                    .get(&base)
                    .map_or_else(|| base.clone(), |entry| entry.display_name.clone());
                voices.push(InstalledVoice {
                    key: format!("{CUSTOM_PREFIX}{base}"),
                    name,
                    source: VoiceSource::Custom,
                    quality: None,
                    language: None,
                });
            }
        }

        debug!(count = voices.len(), "Discovered installed voices");
        Ok(voices)
    }

    // ── Resolution ─────────────────────────────────────────────────

    /// Resolve `key` to its files, or `None` if it is not installed.
    ///
    /// `custom:`-prefixed keys only look in the custom directory; anything
    /// else checks the bundled directory, then the download directory.
    pub async fn resolve(&self, key: &str) -> Option<VoicePaths> {
        if let Some(base) = key.strip_prefix(CUSTOM_PREFIX) {
            if !is_valid_asset_key(base) {
                return None;
            }
            return installed_paths(&self.paths.custom_voices_dir(), base).await;
        }

        if !is_valid_asset_key(key) {
            return None;
        }

        for dir in [
            self.paths.bundled_voices_dir(),
            self.paths.downloaded_voices_dir(),
        ] {
            if let Some(paths) = installed_paths(&dir, key).await {
                return Some(paths);
            }
        }
        None
    }

    /// Resolve `key`, falling back to the first installed voice.
    pub async fn resolve_or_fallback(&self, key: &str) -> Result<ResolvedVoice, LibraryError> {
        if let Some(paths) = self.resolve(key).await {
            return Ok(ResolvedVoice {
                key: key.to_string(),
                paths,
            });
        }

        for voice in self.list_installed().await? {
            if let Some(paths) = self.resolve(&voice.key).await {
                warn!(requested = key, fallback = %voice.key, "Voice not installed, using fallback");
                return Ok(ResolvedVoice {
                    key: voice.key,
                    paths,
                });
            }
        }

        Err(LibraryError::NoVoicesInstalled)
    }

    // ── Custom voices ──────────────────────────────────────────────

    /// Copy a Piper model and its `.onnx.json` config into the custom
    /// directory and record its display name.
    pub async fn import_custom(
        &self,
        model: &Path,
        display_name: Option<&str>,
    ) -> Result<InstalledVoice, LibraryError> {
        let is_onnx = model
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(VOICE_MODEL_EXT));
        if !is_onnx {
            return Err(LibraryError::NotAModel(model.to_path_buf()));
        }
        if !is_file(model).await {
            return Err(LibraryError::NotFound(model.display().to_string()));
        }

        let mut config = model.as_os_str().to_owned();
        config.push(".json");
        let config = PathBuf::from(config);
        if !is_file(&config).await {
            return Err(LibraryError::MissingConfig(config));
        }

        let base = model
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| is_valid_asset_key(s))
            .ok_or_else(|| LibraryError::InvalidKey(model.display().to_string()))?
            .to_string();

        let dir = self.paths.custom_voices_dir();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| LibraryError::io(&dir, e))?;

        let (dest_model, dest_config) = voice_files(&dir, &base);
        fs::copy(model, &dest_model)
            .await
            .map_err(|e| LibraryError::io(&dest_model, e))?;
        if let Err(e) = fs::copy(&config, &dest_config).await {
            remove_quietly(&dest_model).await;
            return Err(LibraryError::io(&dest_config, e));
        }

        let name = display_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(base.as_str())
            .to_string();

        let mut metadata = self.read_metadata().await?;
        metadata.voices.insert(
            base.clone(),
            CustomVoiceEntry {
                display_name: name.clone(),
                added_at: chrono::Utc::now().to_rfc3339(),
            },
        );
        self.write_metadata(&metadata).await?;

        info!(key = %base, name = %name, "Imported custom voice");
        Ok(InstalledVoice {
            key: format!("{CUSTOM_PREFIX}{base}"),
            name,
            source: VoiceSource::Custom,
            quality: None,
            language: None,
        })
    }

    /// Ask the user for a model file and import it.
    ///
    /// Returns `Ok(None)` when the picker is cancelled.
    pub async fn import_with_picker(
        &self,
        picker: &dyn FilePicker,
        display_name: Option<&str>,
    ) -> Result<Option<InstalledVoice>, LibraryError> {
        let Some(model) = picker.pick_file("Select a Piper voice model", &[VOICE_MODEL_EXT]) else {
            debug!("Custom voice import cancelled");
            return Ok(None);
        };
        self.import_custom(&model, display_name).await.map(Some)
    }

    /// Delete an imported voice and its metadata entry.
    ///
    /// Accepts the key with or without the `custom:` prefix.
    pub async fn remove_custom(&self, key: &str) -> Result<(), LibraryError> {
        let base = key.strip_prefix(CUSTOM_PREFIX).unwrap_or(key);
        if !is_valid_asset_key(base) {
            return Err(LibraryError::InvalidKey(key.to_string()));
        }

        remove_pair(&self.paths.custom_voices_dir(), base, key).await?;

        let mut metadata = self.read_metadata().await?;
        if metadata.voices.remove(base).is_some() {
            self.write_metadata(&metadata).await?;
        }

        info!(key = %base, "Removed custom voice");
        Ok(())
    }

    /// Delete a voice from the download directory.
    pub async fn remove_downloaded(&self, key: &str) -> Result<(), LibraryError> {
        if !is_valid_asset_key(key) {
            return Err(LibraryError::InvalidKey(key.to_string()));
        }
        remove_pair(&self.paths.downloaded_voices_dir(), key, key).await?;
        info!(key, "Removed downloaded voice");
        Ok(())
    }

    // ── Metadata sidecar ───────────────────────────────────────────

    /// Read the custom voice sidecar. A missing file is an empty map.
    pub async fn read_metadata(&self) -> Result<CustomVoiceMetadata, LibraryError> {
        let path = self.paths.custom_metadata_path();
        match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|source| LibraryError::Metadata { path, source }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(CustomVoiceMetadata::default()),
            Err(e) => Err(LibraryError::io(path, e)),
        }
    }

    async fn write_metadata(&self, metadata: &CustomVoiceMetadata) -> Result<(), LibraryError> {
        let path = self.paths.custom_metadata_path();
        let json = serde_json::to_vec_pretty(metadata).map_err(|source| LibraryError::Metadata {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json)
            .await
            .map_err(|e| LibraryError::io(path, e))
    }
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "Failed to remove partial import");
        }
    }
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_file())
}

async fn installed_paths(dir: &Path, key: &str) -> Option<VoicePaths> {
    let (model, config) = voice_files(dir, key);
    if is_file(&model).await && is_file(&config).await {
        Some(VoicePaths { model, config })
    } else {
        None
    }
}

async fn is_installed_in(dir: &Path, key: &str) -> bool {
    installed_paths(dir, key).await.is_some()
}

/// Keys of all complete voice pairs in `dir`, sorted. Missing dir → empty.
async fn scan_voice_dir(dir: &Path) -> Result<Vec<String>, LibraryError> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(LibraryError::io(dir, e)),
    };

    let mut keys = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| LibraryError::io(dir, e))?
    {
        let path = entry.path();
        let is_model = path
            .extension()
            .is_some_and(|ext| ext == VOICE_MODEL_EXT);
        if !is_model {
            continue;
        }
        let Some(key) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if is_valid_asset_key(key) && is_installed_in(dir, key).await {
            keys.push(key.to_string());
        }
    }

    keys.sort();
    Ok(keys)
}

/// Remove `<key>.onnx` and `<key>.onnx.json` from `dir`.
///
/// Fails with `NotFound` if neither existed.
async fn remove_pair(dir: &Path, key: &str, display_key: &str) -> Result<(), LibraryError> {
    let (model, config) = voice_files(dir, key);
    let mut removed = false;
    for path in [model, config] {
        match fs::remove_file(&path).await {
            Ok(()) => removed = true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(LibraryError::io(path, e)),
        }
    }
    if removed {
        Ok(())
    } else {
        Err(LibraryError::NotFound(display_key.to_string()))
    }
}
