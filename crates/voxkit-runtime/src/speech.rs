//! Piper synthesis with a single active-utterance slot.
//!
//! Each `speak` call spawns one Piper process, feeds it the text on stdin and
//! collects the WAV it writes. The most recent process is tracked so `stop`
//! can terminate it; starting a new utterance replaces the slot without
//! touching the previous process.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use voxkit_core::TempDirProvider;
use voxkit_voice::VoiceLibrary;

use crate::cleanup::remove_quietly;
use crate::error::SpeechError;
use crate::install::PiperLocator;
use crate::shutdown::shutdown_child;

/// Synthesized audio, ready to hand to a UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizedAudio {
    /// Voice that was actually used (may differ from the request after fallback).
    pub voice: String,
    /// Base64-encoded WAV.
    pub audio_base64: String,
}

struct ActiveSpeech {
    id: u64,
    cancel: CancellationToken,
}

/// Runs Piper, one tracked utterance at a time.
pub struct SpeechSynthesizer {
    library: VoiceLibrary,
    locator: PiperLocator,
    temp: Arc<dyn TempDirProvider>,
    active: Mutex<Option<ActiveSpeech>>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for SpeechSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechSynthesizer")
            .field("locator", &self.locator)
            .field("speaking", &self.is_speaking())
            .finish_non_exhaustive()
    }
}

/// Piper's `--length_scale` for a speed multiplier.
pub fn length_scale(speed: f32) -> String {
    format!("{:.2}", 1.0 / speed)
}

impl SpeechSynthesizer {
    pub fn new(library: VoiceLibrary, locator: PiperLocator, temp: Arc<dyn TempDirProvider>) -> Self {
        Self {
            library,
            locator,
            temp,
            active: Mutex::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    /// Whether an utterance is currently tracked.
    pub fn is_speaking(&self) -> bool {
        self.lock_active().is_some()
    }

    /// Synthesize `text` with `voice_key` at `speed` (1.0 = normal).
    ///
    /// Falls back to the first installed voice when `voice_key` is missing.
    pub async fn speak(
        &self,
        text: &str,
        voice_key: &str,
        speed: f32,
    ) -> Result<SynthesizedAudio, SpeechError> {
        if text.trim().is_empty() {
            return Err(SpeechError::EmptyText);
        }
        if !speed.is_finite() || speed <= 0.0 {
            return Err(SpeechError::InvalidSpeed(speed));
        }

        let voice = self.library.resolve_or_fallback(voice_key).await?;
        let piper = self.locator.locate().ok_or(SpeechError::EngineNotInstalled)?;

        let temp_dir = self.temp.temp_dir();
        fs::create_dir_all(&temp_dir)
            .await
            .map_err(|source| SpeechError::Io {
                path: temp_dir.clone(),
                source,
            })?;
        let output = temp_dir.join(format!(
            "voxkit-tts-{}-{}.wav",
            chrono::Utc::now().timestamp_millis(),
            uuid::Uuid::new_v4()
        ));
        let scale = length_scale(speed);

        let mut child = Command::new(&piper)
            .arg("--model")
            .arg(&voice.paths.model)
            .arg("--output_file")
            .arg(&output)
            .arg("--length_scale")
            .arg(&scale)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SpeechError::Spawn {
                path: piper.clone(),
                source,
            })?;

        let (id, cancel) = self.begin();
        info!(voice = %voice.key, length_scale = %scale, "Speaking");

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(text.as_bytes()).await {
                warn!(error = %e, "Failed to write text to piper");
            }
            // Dropping stdin closes it so piper starts synthesizing
        }

        let stderr_task = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let _ = stderr.read_to_end(&mut buf).await;
                buf
            })
        });

        let status = tokio::select! {
            status = child.wait() => status,
            () = cancel.cancelled() => {
                debug!(id, "Stopping piper");
                if let Err(e) = shutdown_child(child).await {
                    warn!(error = %e, "Failed to stop piper cleanly");
                }
                self.finish(id);
                remove_quietly(&output).await;
                return Err(SpeechError::Stopped);
            }
        };
        self.finish(id);

        let status = status.map_err(|source| SpeechError::Io {
            path: piper.clone(),
            source,
        })?;

        let stderr = match stderr_task {
            Some(task) => task.await.unwrap_or_default(),
            None => Vec::new(),
        };
        let stderr = String::from_utf8_lossy(&stderr).trim().to_string();

        if !status.success() {
            remove_quietly(&output).await;
            return Err(SpeechError::Failed {
                code: status.code(),
                stderr,
            });
        }

        let audio = match fs::read(&output).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SpeechError::NoOutput {
                    code: status.code(),
                    stderr,
                });
            }
            Err(source) => {
                remove_quietly(&output).await;
                return Err(SpeechError::Io {
                    path: output,
                    source,
                });
            }
        };
        remove_quietly(&output).await;

        Ok(SynthesizedAudio {
            voice: voice.key,
            audio_base64: BASE64.encode(audio),
        })
    }

    /// Terminate the tracked utterance, if any. Returns whether one was tracked.
    ///
    /// Does not wait for the process to exit; the pending `speak` call
    /// finishes with [`SpeechError::Stopped`].
    pub fn stop(&self) -> bool {
        match self.lock_active().take() {
            Some(active) => {
                info!(id = active.id, "Stop requested");
                active.cancel.cancel();
                true
            }
            None => false,
        }
    }

    fn begin(&self) -> (u64, CancellationToken) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();
        let previous = self.lock_active().replace(ActiveSpeech {
            id,
            cancel: cancel.clone(),
        });
        if let Some(previous) = previous {
            debug!(previous = previous.id, id, "New utterance replaces tracked one");
        }
        (id, cancel)
    }

    /// Clear the slot if it still belongs to `id`.
    fn finish(&self, id: u64) {
        let mut active = self.lock_active();
        if active.as_ref().is_some_and(|a| a.id == id) {
            *active = None;
        }
    }

    fn lock_active(&self) -> std::sync::MutexGuard<'_, Option<ActiveSpeech>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Decode the WAV payload and write it to `dest`.
pub fn decode_to_file(audio: &SynthesizedAudio, dest: &Path) -> Result<PathBuf, SpeechError> {
    let bytes = BASE64
        .decode(&audio.audio_base64)
        .map_err(|e| SpeechError::Io {
            path: dest.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;
    std::fs::write(dest, bytes).map_err(|source| SpeechError::Io {
        path: dest.to_path_buf(),
        source,
    })?;
    Ok(dest.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_scale_is_inverse_speed_with_two_decimals() {
        assert_eq!(length_scale(1.0), "1.00");
        assert_eq!(length_scale(2.0), "0.50");
        assert_eq!(length_scale(0.5), "2.00");
        assert_eq!(length_scale(3.0), "0.33");
    }
}
