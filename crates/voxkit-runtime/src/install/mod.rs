//! Installers for the Piper engine, Piper voices and whisper models.
//!
//! Every installer follows the same steps:
//!
//! 1. ensure the target directory exists
//! 2. download, forwarding progress to the [`ProgressSink`]
//! 3. for archives, extract and then delete the archive
//! 4. for executables, set the executable bit
//! 5. verify by re-running the "is it installed?" check

mod locate;
mod platform;

pub use locate::{PiperLocator, SYSTEM_BIN_DIRS, is_executable, make_executable};
pub use platform::{PIPER_RELEASE, PIPER_RELEASE_BASE, PiperPlatform, current_platform_id};

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{info, warn};
use voxkit_core::paths::{is_valid_asset_key, voice_files};
use voxkit_core::{AssetPaths, EngineStatus, ProgressSink, VoicePaths};
use voxkit_download::{Downloader, extract};
use voxkit_voice::catalog::VOICE_FILES_BASE_URL;
use voxkit_voice::{VoiceCatalogEntry, WHISPER_MODELS_BASE_URL, find_whisper_model};

use crate::cleanup::remove_quietly;
use crate::error::InstallError;

/// Where installers download from. Overridable for mirrors and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallSources {
    pub piper_release_base: String,
    pub voice_files_base: String,
    pub whisper_models_base: String,
}

impl Default for InstallSources {
    fn default() -> Self {
        Self {
            piper_release_base: PIPER_RELEASE_BASE.to_string(),
            voice_files_base: VOICE_FILES_BASE_URL.to_string(),
            whisper_models_base: WHISPER_MODELS_BASE_URL.to_string(),
        }
    }
}

/// Downloads and verifies engine binaries and model files.
#[derive(Debug, Clone)]
pub struct Installer {
    paths: AssetPaths,
    downloader: Downloader,
    locator: PiperLocator,
    sources: InstallSources,
}

impl Installer {
    pub fn new(paths: AssetPaths, downloader: Downloader) -> Self {
        let locator = PiperLocator::new(paths.clone());
        Self {
            paths,
            downloader,
            locator,
            sources: InstallSources::default(),
        }
    }

    #[must_use]
    pub fn with_sources(mut self, sources: InstallSources) -> Self {
        self.sources = sources;
        self
    }

    #[must_use]
    pub fn with_locator(mut self, locator: PiperLocator) -> Self {
        self.locator = locator;
        self
    }

    pub const fn locator(&self) -> &PiperLocator {
        &self.locator
    }

    // ── Piper engine ───────────────────────────────────────────────

    /// Whether Piper can be found, and where.
    pub fn piper_status(&self) -> EngineStatus {
        let path = self.locator.locate();
        EngineStatus {
            installed: path.is_some(),
            path,
        }
    }

    /// Download and unpack the Piper release for `platform_id`.
    ///
    /// An unsupported identifier fails before anything is downloaded.
    /// Returns the path of the installed executable.
    pub async fn install_piper(
        &self,
        platform_id: &str,
        progress: &dyn ProgressSink,
    ) -> Result<PathBuf, InstallError> {
        let platform = PiperPlatform::parse(platform_id)?;
        let bin_dir = self.paths.piper_bin_dir();
        fs::create_dir_all(&bin_dir)
            .await
            .map_err(|e| InstallError::io(&bin_dir, e))?;

        let url = platform.archive_url(&self.sources.piper_release_base);
        let archive = bin_dir.join(platform.archive_name());
        info!(%platform, %url, "Installing Piper");

        progress.report("Downloading Piper", Some(0));
        self.downloader
            .download(&url, &archive, |pct| {
                progress.report("Downloading Piper", Some(pct));
            })
            .await?;

        progress.report("Extracting Piper", None);
        let extracted = extract(&archive, &bin_dir).await;
        if let Err(e) = fs::remove_file(&archive).await {
            warn!(archive = %archive.display(), error = %e, "Failed to remove Piper archive");
        }
        extracted?;

        let primary = self.paths.piper_primary_binary();
        if primary.is_file() {
            make_executable(&primary).map_err(|e| InstallError::io(&primary, e))?;
        }

        let installed = PiperLocator::managed_only(self.paths.clone())
            .locate()
            .ok_or_else(|| InstallError::VerificationFailed("the piper executable".to_string()))?;

        progress.report("Piper installed", Some(100));
        info!(path = %installed.display(), "Piper installed");
        Ok(installed)
    }

    // ── Piper voices ───────────────────────────────────────────────

    /// Download a catalog voice's model and config into the download directory.
    ///
    /// Sizes are checked against the catalog when it declares them. On any
    /// failure both files are removed.
    pub async fn install_voice(
        &self,
        entry: &VoiceCatalogEntry,
        progress: &dyn ProgressSink,
    ) -> Result<VoicePaths, InstallError> {
        let key = entry.key.as_str();
        if !is_valid_asset_key(key) {
            return Err(InstallError::InvalidKey(key.to_string()));
        }
        let (Some((model_src, model_info)), Some((config_src, config_info))) =
            (entry.model_file(), entry.config_file())
        else {
            return Err(InstallError::IncompleteEntry(key.to_string()));
        };

        let dir = self.paths.downloaded_voices_dir();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| InstallError::io(&dir, e))?;
        let (model, config) = voice_files(&dir, key);

        info!(key, "Installing voice");
        let result = async {
            let message = format!("Downloading voice {key}");
            progress.report(&message, Some(0));
            self.downloader
                .download(&self.voice_url(model_src), &model, |pct| {
                    progress.report(&message, Some(pct));
                })
                .await?;

            progress.report(&format!("Downloading config for {key}"), None);
            self.downloader
                .download(&self.voice_url(config_src), &config, |_| {})
                .await?;

            verify_size(&model, model_info.size_bytes).await?;
            verify_size(&config, config_info.size_bytes).await?;
            Ok::<_, InstallError>(())
        }
        .await;

        if let Err(e) = result {
            warn!(key, error = %e, "Voice install failed, cleaning up");
            for path in [&model, &config] {
                remove_quietly(path).await;
            }
            return Err(e);
        }

        let paths = VoicePaths { model, config };
        if !paths.exist() {
            return Err(InstallError::VerificationFailed(format!("voice {key}")));
        }

        progress.report(&format!("Voice {key} installed"), Some(100));
        info!(key, "Voice installed");
        Ok(paths)
    }

    fn voice_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.sources.voice_files_base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    // ── Whisper models ─────────────────────────────────────────────

    /// Download a whisper.cpp model from the curated list.
    pub async fn install_whisper_model(
        &self,
        key: &str,
        progress: &dyn ProgressSink,
    ) -> Result<PathBuf, InstallError> {
        let model = find_whisper_model(key).ok_or_else(|| InstallError::UnknownModel(key.to_string()))?;
        let dir = self.paths.whisper_models_dir();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| InstallError::io(&dir, e))?;

        let dest = self.paths.whisper_model_path(model.key);
        let url = format!(
            "{}/{}",
            self.sources.whisper_models_base.trim_end_matches('/'),
            model.file_name()
        );
        info!(key, %url, "Installing whisper model");

        let message = format!("Downloading {}", model.name);
        progress.report(&message, Some(0));
        self.downloader
            .download(&url, &dest, |pct| progress.report(&message, Some(pct)))
            .await?;

        if !is_non_empty_file(&dest).await {
            remove_quietly(&dest).await;
            return Err(InstallError::VerificationFailed(format!("model {key}")));
        }

        progress.report(&format!("{} installed", model.name), Some(100));
        Ok(dest)
    }

    /// Keys of installed whisper models, sorted.
    pub async fn installed_whisper_models(&self) -> Result<Vec<String>, InstallError> {
        let dir = self.paths.whisper_models_dir();
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(InstallError::io(&dir, e)),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| InstallError::io(&dir, e))?
        {
            let name = entry.file_name();
            let Some(key) = name
                .to_str()
                .and_then(|n| n.strip_prefix("ggml-"))
                .and_then(|n| n.strip_suffix(".bin"))
            else {
                continue;
            };
            if is_non_empty_file(&entry.path()).await {
                keys.push(key.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }

    /// Delete an installed whisper model.
    pub async fn remove_whisper_model(&self, key: &str) -> Result<(), InstallError> {
        if !is_valid_asset_key(key) {
            return Err(InstallError::InvalidKey(key.to_string()));
        }
        let path = self.paths.whisper_model_path(key);
        fs::remove_file(&path)
            .await
            .map_err(|e| InstallError::io(&path, e))?;
        info!(key, "Removed whisper model");
        Ok(())
    }
}

async fn verify_size(path: &Path, expected: u64) -> Result<(), InstallError> {
    let actual = fs::metadata(path)
        .await
        .map_err(|e| InstallError::io(path, e))?
        .len();
    if expected > 0 && actual != expected {
        return Err(InstallError::SizeMismatch {
            path: path.to_path_buf(),
            expected,
            actual,
        });
    }
    Ok(())
}

async fn is_non_empty_file(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .is_ok_and(|m| m.is_file() && m.len() > 0)
}
