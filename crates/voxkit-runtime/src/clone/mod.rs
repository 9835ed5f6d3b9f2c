//! XTTS voice cloning: reference management and synthesis.
//!
//! Each cloned voice lives in `<root>/xtts/voices/<id>/` as a
//! `reference.wav` plus a `voice.json` describing it. Synthesis is delegated
//! to the [`XttsServer`].

mod media;
mod samples;
mod server;

pub use media::{CLIP_SAMPLE_RATE, MAX_CLIP_SECS, MIN_CLIP_SECS, MediaTools, validate_clip};
pub use samples::{SAMPLE_VOICES, SAMPLES_BASE_URL, SampleVoice, find_sample};
pub use server::{XttsOptions, XttsRequest, XttsServer, XttsServerConfig};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, warn};
use voxkit_core::paths::{XTTS_METADATA_FILE, XTTS_REFERENCE_FILE, is_valid_asset_key};
use voxkit_core::{AssetPaths, ProgressSink, TempDirProvider};
use voxkit_download::Downloader;

use crate::cleanup::remove_quietly;
use crate::error::CloneError;
use crate::speech::SynthesizedAudio;

/// A cloned voice, as stored in its `voice.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XttsVoice {
    pub id: String,
    pub name: String,
    pub language: String,
    pub reference_audio: PathBuf,
    pub created_at: DateTime<Utc>,
}

/// Voice id for a display name: its letters and digits, lowercased.
pub fn voice_id(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Creates, lists and speaks with cloned voices.
pub struct CloneManager {
    paths: AssetPaths,
    temp: Arc<dyn TempDirProvider>,
    tools: MediaTools,
    server: XttsServer,
    downloader: Downloader,
    samples_base: String,
}

impl std::fmt::Debug for CloneManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloneManager")
            .field("paths", &self.paths)
            .field("tools", &self.tools)
            .field("server", &self.server)
            .finish_non_exhaustive()
    }
}

impl CloneManager {
    pub fn new(
        paths: AssetPaths,
        temp: Arc<dyn TempDirProvider>,
        server: XttsServerConfig,
        downloader: Downloader,
    ) -> Self {
        Self {
            paths,
            temp,
            tools: MediaTools::default(),
            server: XttsServer::new(server),
            downloader,
            samples_base: SAMPLES_BASE_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_media_tools(mut self, tools: MediaTools) -> Self {
        self.tools = tools;
        self
    }

    #[must_use]
    pub fn with_samples_base(mut self, base: impl Into<String>) -> Self {
        self.samples_base = base.into();
        self
    }

    pub const fn server(&self) -> &XttsServer {
        &self.server
    }

    /// Create a cloned voice from an existing recording.
    ///
    /// The recording is copied; the original is left in place. A voice with
    /// the same id is replaced.
    pub async fn create(
        &self,
        name: &str,
        reference_audio: &Path,
        language: &str,
    ) -> Result<XttsVoice, CloneError> {
        if !fs::metadata(reference_audio)
            .await
            .is_ok_and(|m| m.is_file())
        {
            return Err(CloneError::ReferenceNotFound(reference_audio.to_path_buf()));
        }

        let id = voice_id(name);
        if id.is_empty() {
            return Err(CloneError::InvalidName);
        }

        let dir = self.paths.xtts_voice_dir(&id);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| CloneError::io(&dir, e))?;

        let reference = dir.join(XTTS_REFERENCE_FILE);
        fs::copy(reference_audio, &reference)
            .await
            .map_err(|e| CloneError::io(&reference, e))?;

        let voice = XttsVoice {
            id,
            name: name.trim().to_string(),
            language: language.to_string(),
            reference_audio: reference,
            created_at: Utc::now(),
        };

        let metadata = dir.join(XTTS_METADATA_FILE);
        let json = serde_json::to_vec_pretty(&voice).map_err(|source| CloneError::Metadata {
            path: metadata.clone(),
            source,
        })?;
        fs::write(&metadata, json)
            .await
            .map_err(|e| CloneError::io(&metadata, e))?;

        info!(id = %voice.id, name = %voice.name, "Created cloned voice");
        Ok(voice)
    }

    /// Cut a reference clip out of a longer recording and create a voice from it.
    pub async fn import_from_media(
        &self,
        media: &Path,
        name: &str,
        language: &str,
        start: f64,
        end: f64,
    ) -> Result<XttsVoice, CloneError> {
        if !fs::metadata(media).await.is_ok_and(|m| m.is_file()) {
            return Err(CloneError::ReferenceNotFound(media.to_path_buf()));
        }
        let len = validate_clip(start, end)?;

        let duration = self.tools.probe_duration(media).await?;
        if end > duration {
            return Err(CloneError::ClipOutOfRange { end, duration });
        }

        let clip = self.temp_file("voxkit-clip").await?;
        let result = async {
            self.tools.extract_clip(media, start, len, &clip).await?;
            self.create(name, &clip, language).await
        }
        .await;
        remove_quietly(&clip).await;
        result
    }

    /// Download one of the [`SAMPLE_VOICES`] and create a voice from it.
    pub async fn download_sample(
        &self,
        sample_id: &str,
        progress: &dyn ProgressSink,
    ) -> Result<XttsVoice, CloneError> {
        let sample = find_sample(sample_id)
            .ok_or_else(|| CloneError::UnknownSample(sample_id.to_string()))?;
        let url = format!("{}/{}", self.samples_base.trim_end_matches('/'), sample.file);
        let dest = self.temp_file("voxkit-sample").await?;

        let message = format!("Downloading {}", sample.name);
        progress.report(&message, Some(0));
        let result = async {
            self.downloader
                .download(&url, &dest, |pct| progress.report(&message, Some(pct)))
                .await?;
            self.create(sample.name, &dest, sample.language).await
        }
        .await;
        remove_quietly(&dest).await;
        result
    }

    /// All cloned voices, newest first. Unreadable entries are skipped.
    pub async fn list(&self) -> Result<Vec<XttsVoice>, CloneError> {
        let dir = self.paths.xtts_voices_dir();
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CloneError::io(&dir, e)),
        };

        let mut voices = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CloneError::io(&dir, e))?
        {
            let metadata = entry.path().join(XTTS_METADATA_FILE);
            match read_voice(&metadata).await {
                Ok(voice) => voices.push(voice),
                Err(e) => warn!(path = %metadata.display(), error = %e, "Skipping cloned voice"),
            }
        }

        voices.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(voices)
    }

    /// Load one cloned voice.
    pub async fn get(&self, id: &str) -> Result<XttsVoice, CloneError> {
        if !is_valid_asset_key(id) {
            return Err(CloneError::NotFound(id.to_string()));
        }
        let metadata = self.paths.xtts_voice_dir(id).join(XTTS_METADATA_FILE);
        if !fs::metadata(&metadata).await.is_ok_and(|m| m.is_file()) {
            return Err(CloneError::NotFound(id.to_string()));
        }
        read_voice(&metadata).await
    }

    /// Delete a cloned voice and its reference recording.
    pub async fn delete(&self, id: &str) -> Result<(), CloneError> {
        if !is_valid_asset_key(id) {
            return Err(CloneError::NotFound(id.to_string()));
        }
        let dir = self.paths.xtts_voice_dir(id);
        match fs::remove_dir_all(&dir).await {
            Ok(()) => {
                info!(id, "Deleted cloned voice");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(CloneError::NotFound(id.to_string()))
            }
            Err(e) => Err(CloneError::io(&dir, e)),
        }
    }

    /// Synthesize `text` in a cloned voice via the inference server.
    pub async fn speak(
        &self,
        id: &str,
        text: &str,
        options: XttsOptions,
    ) -> Result<SynthesizedAudio, CloneError> {
        if text.trim().is_empty() {
            return Err(CloneError::EmptyText);
        }
        let voice = self.get(id).await?;
        let output = self.temp_file("voxkit-xtts").await?;

        let request = XttsRequest::synthesize(
            text,
            &voice.reference_audio,
            &voice.language,
            &output,
            options,
        );
        info!(id, "Synthesizing with cloned voice");

        let result = async {
            self.server.synthesize(&request).await?;
            fs::read(&output).await.map_err(|e| CloneError::io(&output, e))
        }
        .await;
        remove_quietly(&output).await;

        Ok(SynthesizedAudio {
            voice: voice.id,
            audio_base64: BASE64.encode(result?),
        })
    }

    /// Stop the inference server.
    pub async fn shutdown(&self) {
        self.server.shutdown().await;
    }

    async fn temp_file(&self, prefix: &str) -> Result<PathBuf, CloneError> {
        let dir = self.temp.temp_dir();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| CloneError::io(&dir, e))?;
        Ok(dir.join(format!("{prefix}-{}.wav", uuid::Uuid::new_v4())))
    }
}

async fn read_voice(path: &Path) -> Result<XttsVoice, CloneError> {
    let bytes = fs::read(path).await.map_err(|e| CloneError::io(path, e))?;
    serde_json::from_slice(&bytes).map_err(|source| CloneError::Metadata {
        path: path.to_path_buf(),
        source,
    })
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_keep_only_lowercased_alphanumerics() {
        assert_eq!(voice_id("Grandpa Joe!"), "grandpajoe");
        assert_eq!(voice_id("  R2-D2  "), "r2d2");
        assert_eq!(voice_id("***"), "");
    }

    #[test]
    fn samples_have_unique_ids() {
        for (i, a) in SAMPLE_VOICES.iter().enumerate() {
            assert!(SAMPLE_VOICES.iter().skip(i + 1).all(|b| b.id != a.id));
        }
        assert_eq!(find_sample("en_sample").unwrap().language, "en");
    }
}
