//! The state container that owns every voxkit service.
//!
//! One `VoiceOrchestrator` replaces what would otherwise be process-wide
//! globals: the catalog cache, the active speech slot and the inference
//! server all live inside it. Embedders create one and call its methods.
//!
//! Settings that choose *how* services are wired (catalog URL and TTL,
//! XTTS server command, whisper-cli path) are read when the orchestrator is
//! built. Settings that choose *what* to use (voice, speed, whisper model)
//! are read on every call.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};
use voxkit_core::{
    AssetPaths, EngineStatus, FilePicker, InstalledVoice, ModelStatus, ProgressSink, Settings,
    SettingsError, SettingsStore, SettingsUpdate, SystemTempDir, TempDirProvider, VoicePaths,
};
use voxkit_download::{DownloadError, Downloader};
use voxkit_voice::{
    BUILTIN_VOICES, CUSTOM_PREFIX, CatalogCache, CatalogError, CatalogSource, DEFAULT_CATALOG_URL,
    HttpCatalogSource, LibraryError, VoiceCatalogEntry, VoiceLibrary, default_whisper_model,
};

use crate::clone::{CloneManager, MediaTools, XttsOptions, XttsServerConfig, XttsVoice};
use crate::error::{CloneError, InstallError, SpeechError, TranscribeError};
use crate::install::{InstallSources, Installer, PiperLocator, current_platform_id};
use crate::speech::{SpeechSynthesizer, SynthesizedAudio};
use crate::transcribe::Transcriber;

/// Overrides for [`VoiceOrchestrator`] construction.
pub struct OrchestratorBuilder {
    paths: AssetPaths,
    temp: Arc<dyn TempDirProvider>,
    locator: Option<PiperLocator>,
    catalog_source: Option<Arc<dyn CatalogSource>>,
    install_sources: InstallSources,
    media_tools: MediaTools,
}

impl OrchestratorBuilder {
    #[must_use]
    pub fn temp_dir(mut self, temp: Arc<dyn TempDirProvider>) -> Self {
        self.temp = temp;
        self
    }

    #[must_use]
    pub fn piper_locator(mut self, locator: PiperLocator) -> Self {
        self.locator = Some(locator);
        self
    }

    #[must_use]
    pub fn catalog_source(mut self, source: Arc<dyn CatalogSource>) -> Self {
        self.catalog_source = Some(source);
        self
    }

    #[must_use]
    pub fn install_sources(mut self, sources: InstallSources) -> Self {
        self.install_sources = sources;
        self
    }

    #[must_use]
    pub fn media_tools(mut self, tools: MediaTools) -> Self {
        self.media_tools = tools;
        self
    }

    pub fn build(self) -> Result<VoiceOrchestrator, DownloadError> {
        let settings_store = SettingsStore::new(self.paths.settings_path());
        let settings = settings_store.load().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load settings, using defaults");
            Settings::default()
        });

        let downloader = Downloader::new()?;
        let locator = self
            .locator
            .unwrap_or_else(|| PiperLocator::new(self.paths.clone()));

        let catalog_source = self.catalog_source.unwrap_or_else(|| {
            let url = settings
                .catalog_url
                .clone()
                .unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string());
            Arc::new(HttpCatalogSource::new(downloader.clone(), url))
        });
        let catalog = CatalogCache::new(catalog_source, settings.catalog_ttl());

        let library = VoiceLibrary::new(self.paths.clone());
        let installer = Installer::new(self.paths.clone(), downloader.clone())
            .with_sources(self.install_sources)
            .with_locator(locator.clone());
        let speech = SpeechSynthesizer::new(library.clone(), locator, Arc::clone(&self.temp));

        let xtts = XttsServerConfig {
            program: PathBuf::from(settings.xtts_program()),
            args: settings.xtts_server_script.clone().into_iter().collect(),
        };
        let clones = CloneManager::new(self.paths.clone(), Arc::clone(&self.temp), xtts, downloader)
            .with_media_tools(self.media_tools);

        let transcriber = Transcriber::new(
            self.paths.clone(),
            settings.whisper_cli_path.as_ref().map(PathBuf::from),
        );

        Ok(VoiceOrchestrator {
            paths: self.paths,
            settings: settings_store,
            catalog,
            library,
            installer,
            speech,
            clones,
            transcriber,
        })
    }
}

/// Entry point for every voice operation.
pub struct VoiceOrchestrator {
    paths: AssetPaths,
    settings: SettingsStore,
    catalog: CatalogCache,
    library: VoiceLibrary,
    installer: Installer,
    speech: SpeechSynthesizer,
    clones: CloneManager,
    transcriber: Transcriber,
}

impl std::fmt::Debug for VoiceOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceOrchestrator")
            .field("paths", &self.paths)
            .finish_non_exhaustive()
    }
}

impl VoiceOrchestrator {
    /// Start configuring an orchestrator rooted at `paths`.
    pub fn builder(paths: AssetPaths) -> OrchestratorBuilder {
        OrchestratorBuilder {
            paths,
            temp: Arc::new(SystemTempDir),
            locator: None,
            catalog_source: None,
            install_sources: InstallSources::default(),
            media_tools: MediaTools::default(),
        }
    }

    /// An orchestrator with default wiring.
    pub fn new(paths: AssetPaths) -> Result<Self, DownloadError> {
        Self::builder(paths).build()
    }

    pub const fn paths(&self) -> &AssetPaths {
        &self.paths
    }

    pub const fn library(&self) -> &VoiceLibrary {
        &self.library
    }

    pub const fn clones(&self) -> &CloneManager {
        &self.clones
    }

    // ── Settings ───────────────────────────────────────────────────

    pub fn load_settings(&self) -> Result<Settings, SettingsError> {
        self.settings.load()
    }

    pub fn update_settings(&self, update: &SettingsUpdate) -> Result<Settings, SettingsError> {
        self.settings.update(update)
    }

    /// Current settings, or defaults if the file is unreadable.
    async fn current_settings(&self) -> Settings {
        let store = self.settings.clone();
        match tokio::task::spawn_blocking(move || store.load()).await {
            Ok(Ok(settings)) => settings,
            Ok(Err(e)) => {
                warn!(error = %e, "Failed to load settings, using defaults");
                Settings::default()
            }
            Err(e) => {
                warn!(error = %e, "Settings load task failed, using defaults");
                Settings::default()
            }
        }
    }

    async fn apply_settings(&self, update: SettingsUpdate) -> Result<Settings, SettingsError> {
        let store = self.settings.clone();
        let path = store.path().to_path_buf();
        tokio::task::spawn_blocking(move || store.update(&update))
            .await
            .unwrap_or_else(|e| {
                Err(SettingsError::Write {
                    path,
                    source: std::io::Error::other(e),
                })
            })
    }

    // ── Catalog ────────────────────────────────────────────────────

    pub async fn fetch_catalog(
        &self,
        force_refresh: bool,
    ) -> Result<Arc<Vec<VoiceCatalogEntry>>, CatalogError> {
        self.catalog.fetch_catalog(force_refresh).await
    }

    // ── Piper voices ───────────────────────────────────────────────

    pub async fn list_voices(&self) -> Result<Vec<InstalledVoice>, LibraryError> {
        self.library.list_installed().await
    }

    pub async fn resolve_voice(&self, key: &str) -> Option<VoicePaths> {
        self.library.resolve(key).await
    }

    /// Install a voice listed in the remote catalog.
    pub async fn install_voice(
        &self,
        key: &str,
        progress: &dyn ProgressSink,
    ) -> Result<VoicePaths, InstallError> {
        let entry = self.catalog.find(key).await?;
        self.installer.install_voice(&entry, progress).await
    }

    pub async fn import_custom_voice(
        &self,
        model: &Path,
        display_name: Option<&str>,
    ) -> Result<InstalledVoice, LibraryError> {
        self.library.import_custom(model, display_name).await
    }

    pub async fn import_voice_with_picker(
        &self,
        picker: &dyn FilePicker,
        display_name: Option<&str>,
    ) -> Result<Option<InstalledVoice>, LibraryError> {
        self.library.import_with_picker(picker, display_name).await
    }

    /// Remove an imported (`custom:`) or downloaded voice.
    pub async fn remove_voice(&self, key: &str) -> Result<(), LibraryError> {
        if key.starts_with(CUSTOM_PREFIX) {
            self.library.remove_custom(key).await
        } else {
            self.library.remove_downloaded(key).await
        }
    }

    /// Installed voices plus the selected one.
    pub async fn synthesis_status(&self) -> Result<ModelStatus, LibraryError> {
        let voices = self.library.list_installed().await?;
        Ok(ModelStatus {
            installed: !voices.is_empty(),
            available: voices.into_iter().map(|v| v.key).collect(),
            selected: self.current_settings().await.selected_voice,
        })
    }

    // ── Piper engine ───────────────────────────────────────────────

    pub fn piper_status(&self) -> EngineStatus {
        self.installer.piper_status()
    }

    /// Install Piper for `platform_id`, or for the running platform.
    pub async fn install_piper(
        &self,
        platform_id: Option<&str>,
        progress: &dyn ProgressSink,
    ) -> Result<PathBuf, InstallError> {
        let platform_id = platform_id.map_or_else(current_platform_id, str::to_string);
        self.installer.install_piper(&platform_id, progress).await
    }

    // ── Speech ─────────────────────────────────────────────────────

    /// Speak with the given voice and speed, defaulting to the saved settings.
    pub async fn speak(
        &self,
        text: &str,
        voice: Option<&str>,
        speed: Option<f32>,
    ) -> Result<SynthesizedAudio, SpeechError> {
        let settings = self.current_settings().await;
        let voice = voice
            .map(str::to_string)
            .or(settings.selected_voice.clone())
            .unwrap_or_else(|| BUILTIN_VOICES[0].key.to_string());
        let speed = speed.unwrap_or_else(|| settings.effective_speed());
        self.speech.speak(text, &voice, speed).await
    }

    /// Stop the current utterance. Returns whether one was playing.
    pub fn stop(&self) -> bool {
        self.speech.stop()
    }

    pub fn is_speaking(&self) -> bool {
        self.speech.is_speaking()
    }

    // ── Transcription ──────────────────────────────────────────────

    pub async fn transcription_status(&self) -> Result<ModelStatus, InstallError> {
        let available = self.installer.installed_whisper_models().await?;
        Ok(ModelStatus {
            installed: !available.is_empty(),
            available,
            selected: self.current_settings().await.selected_whisper_model,
        })
    }

    pub async fn install_whisper_model(
        &self,
        key: &str,
        progress: &dyn ProgressSink,
    ) -> Result<PathBuf, InstallError> {
        self.installer.install_whisper_model(key, progress).await
    }

    /// Make an installed model the default for transcription.
    pub async fn select_whisper_model(&self, key: &str) -> Result<Settings, InstallError> {
        let installed = self.installer.installed_whisper_models().await?;
        if !installed.iter().any(|k| k == key) {
            return Err(InstallError::NotInstalled(key.to_string()));
        }
        let settings = self
            .apply_settings(SettingsUpdate {
                selected_whisper_model: Some(Some(key.to_string())),
                ..SettingsUpdate::default()
            })
            .await?;
        info!(key, "Selected whisper model");
        Ok(settings)
    }

    /// Delete a model, clearing the selection if it pointed at it.
    pub async fn remove_whisper_model(&self, key: &str) -> Result<(), InstallError> {
        self.installer.remove_whisper_model(key).await?;
        if self.current_settings().await.selected_whisper_model.as_deref() == Some(key) {
            self.apply_settings(SettingsUpdate {
                selected_whisper_model: Some(None),
                ..SettingsUpdate::default()
            })
            .await?;
        }
        Ok(())
    }

    /// Transcribe `audio` with `model`, the selected model, the first
    /// installed model, or the default model, in that order.
    pub async fn transcribe(
        &self,
        audio: &Path,
        model: Option<&str>,
    ) -> Result<String, TranscribeError> {
        let key = match model {
            Some(key) => key.to_string(),
            None => match self.current_settings().await.selected_whisper_model {
                Some(key) => key,
                None => self
                    .installer
                    .installed_whisper_models()
                    .await
                    .ok()
                    .and_then(|keys| keys.into_iter().next())
                    .unwrap_or_else(|| default_whisper_model().key.to_string()),
            },
        };
        self.transcriber.transcribe(audio, &key).await
    }

    // ── Voice cloning ──────────────────────────────────────────────

    pub async fn create_clone(
        &self,
        name: &str,
        reference_audio: &Path,
        language: &str,
    ) -> Result<XttsVoice, CloneError> {
        self.clones.create(name, reference_audio, language).await
    }

    pub async fn import_clone_from_media(
        &self,
        media: &Path,
        name: &str,
        language: &str,
        start: f64,
        end: f64,
    ) -> Result<XttsVoice, CloneError> {
        self.clones
            .import_from_media(media, name, language, start, end)
            .await
    }

    pub async fn download_sample_voice(
        &self,
        sample_id: &str,
        progress: &dyn ProgressSink,
    ) -> Result<XttsVoice, CloneError> {
        self.clones.download_sample(sample_id, progress).await
    }

    pub async fn list_clones(&self) -> Result<Vec<XttsVoice>, CloneError> {
        self.clones.list().await
    }

    pub async fn delete_clone(&self, id: &str) -> Result<(), CloneError> {
        self.clones.delete(id).await
    }

    pub async fn speak_clone(
        &self,
        id: &str,
        text: &str,
        options: XttsOptions,
    ) -> Result<SynthesizedAudio, CloneError> {
        self.clones.speak(id, text, options).await
    }

    /// Stop background processes (the inference server and any utterance).
    pub async fn shutdown(&self) {
        self.speech.stop();
        self.clones.shutdown().await;
    }
}
