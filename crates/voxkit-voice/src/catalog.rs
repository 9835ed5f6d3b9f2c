//! Remote Piper voice catalog with a TTL cache.
//!
//! The manifest (`voices.json`) is a single JSON object keyed by voice key.
//! [`CatalogCache`] keeps the last successful fetch in memory and:
//!
//! - serves it without touching the network while it is younger than the TTL
//! - refreshes it when stale or when the caller forces a refresh
//! - falls back to the stale copy if a refresh fails
//! - lets concurrent callers share a single in-flight refresh

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use voxkit_download::Downloader;

use crate::error::CatalogError;

/// Default location of the Piper voice manifest.
pub const DEFAULT_CATALOG_URL: &str =
    "https://huggingface.co/rhasspy/piper-voices/resolve/main/voices.json";

/// Base URL that catalog file paths are relative to.
pub const VOICE_FILES_BASE_URL: &str = "https://huggingface.co/rhasspy/piper-voices/resolve/main";

/// Default time a fetched catalog stays fresh.
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

// ── Manifest types ─────────────────────────────────────────────────

/// Language block of a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VoiceLanguage {
    pub code: String,
    pub family: String,
    pub region: String,
    pub name_native: String,
    pub name_english: String,
    pub country_english: String,
}

/// One downloadable file of a voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VoiceFile {
    pub size_bytes: u64,
    pub md5_digest: String,
}

/// A voice listed in the remote manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceCatalogEntry {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub language: VoiceLanguage,
    #[serde(default)]
    pub quality: String,
    #[serde(default = "one")]
    pub num_speakers: u32,
    /// Repository-relative path → file info.
    #[serde(default)]
    pub files: BTreeMap<String, VoiceFile>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

const fn one() -> u32 {
    1
}

impl VoiceCatalogEntry {
    /// Repository path and info of the `.onnx` model file.
    pub fn model_file(&self) -> Option<(&str, &VoiceFile)> {
        self.files
            .iter()
            .find(|(path, _)| path.ends_with(".onnx"))
            .map(|(p, f)| (p.as_str(), f))
    }

    /// Repository path and info of the `.onnx.json` config file.
    pub fn config_file(&self) -> Option<(&str, &VoiceFile)> {
        self.files
            .iter()
            .find(|(path, _)| path.ends_with(".onnx.json"))
            .map(|(p, f)| (p.as_str(), f))
    }

    /// Whether this entry answers to `key`, either directly or by alias.
    pub fn matches(&self, key: &str) -> bool {
        self.key == key || self.aliases.iter().any(|a| a == key)
    }
}

/// Absolute download URL of a repository-relative catalog file path.
pub fn voice_file_url(path: &str) -> String {
    format!("{VOICE_FILES_BASE_URL}/{}", path.trim_start_matches('/'))
}

// ── Source port ────────────────────────────────────────────────────

/// Where catalog entries come from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<VoiceCatalogEntry>, CatalogError>;
}

/// Reads the manifest over HTTP through the download engine.
#[derive(Debug, Clone)]
pub struct HttpCatalogSource {
    downloader: Downloader,
    url: String,
}

impl HttpCatalogSource {
    pub fn new(downloader: Downloader, url: impl Into<String>) -> Self {
        Self {
            downloader,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch(&self) -> Result<Vec<VoiceCatalogEntry>, CatalogError> {
        let manifest: BTreeMap<String, VoiceCatalogEntry> =
            self.downloader.fetch_json(&self.url).await?;
        // BTreeMap iteration gives a stable, key-sorted listing
        Ok(manifest.into_values().collect())
    }
}

// ── Cache ──────────────────────────────────────────────────────────

#[derive(Default)]
struct CacheState {
    entries: Option<Arc<Vec<VoiceCatalogEntry>>>,
    fetched_at: Option<Instant>,
    /// Bumped after every completed refresh attempt, successful or not.
    generation: u64,
    last_error: Option<String>,
}

/// TTL cache in front of a [`CatalogSource`].
pub struct CatalogCache {
    source: Arc<dyn CatalogSource>,
    ttl: Duration,
    state: Mutex<CacheState>,
    refresh: tokio::sync::Mutex<()>,
}

impl std::fmt::Debug for CatalogCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl CatalogCache {
    pub fn new(source: Arc<dyn CatalogSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            state: Mutex::new(CacheState::default()),
            refresh: tokio::sync::Mutex::new(()),
        }
    }

    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the catalog, fetching it if missing, stale, or `force_refresh`.
    ///
    /// A failed refresh returns the previous entries when there are any.
    pub async fn fetch_catalog(
        &self,
        force_refresh: bool,
    ) -> Result<Arc<Vec<VoiceCatalogEntry>>, CatalogError> {
        let seen_generation = {
            let state = self.lock_state();
            if !force_refresh {
                if let Some(entries) = self.fresh_entries(&state) {
                    debug!(count = entries.len(), "Voice catalog cache hit");
                    return Ok(entries);
                }
            }
            state.generation
        };

        let _guard = self.refresh.lock().await;

        // Someone else finished a refresh while we were waiting: reuse it.
        {
            let state = self.lock_state();
            if state.generation != seen_generation {
                debug!("Reusing concurrent voice catalog refresh");
                return match &state.entries {
                    Some(entries) => Ok(Arc::clone(entries)),
                    None => Err(CatalogError::Unavailable(
                        state.last_error.clone().unwrap_or_default(),
                    )),
                };
            }
        }

        info!("Fetching voice catalog");
        let result = self.source.fetch().await;

        let mut state = self.lock_state();
        state.generation += 1;
        match result {
            Ok(entries) => {
                info!(count = entries.len(), "Voice catalog updated");
                let entries = Arc::new(entries);
                state.entries = Some(Arc::clone(&entries));
                state.fetched_at = Some(Instant::now());
                state.last_error = None;
                Ok(entries)
            }
            Err(e) => {
                state.last_error = Some(e.to_string());
                match &state.entries {
                    Some(stale) => {
                        warn!(error = %e, "Voice catalog refresh failed, serving stale copy");
                        Ok(Arc::clone(stale))
                    }
                    None => Err(e),
                }
            }
        }
    }

    /// Look up a catalog entry by key or alias.
    pub async fn find(&self, key: &str) -> Result<VoiceCatalogEntry, CatalogError> {
        let entries = self.fetch_catalog(false).await?;
        entries
            .iter()
            .find(|e| e.matches(key))
            .cloned()
            .ok_or_else(|| CatalogError::UnknownVoice(key.to_string()))
    }

    fn fresh_entries(&self, state: &CacheState) -> Option<Arc<Vec<VoiceCatalogEntry>>> {
        let fetched_at = state.fetched_at?;
        if fetched_at.elapsed() < self.ttl {
            state.entries.clone()
        } else {
            None
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
