//! Speech-to-text through the whisper.cpp command-line tool.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::info;
use voxkit_core::AssetPaths;
use voxkit_core::paths::is_valid_asset_key;

use crate::error::{ToolError, TranscribeError};
use crate::tool::run_tool;

/// Upper bound on a single transcription run.
pub const TRANSCRIBE_TIMEOUT: Duration = Duration::from_secs(120);

const WHISPER_CLI: &str = "whisper-cli";

/// Runs `whisper-cli` against installed GGML models.
#[derive(Debug, Clone)]
pub struct Transcriber {
    paths: AssetPaths,
    cli_override: Option<PathBuf>,
}

impl Transcriber {
    pub const fn new(paths: AssetPaths, cli_override: Option<PathBuf>) -> Self {
        Self {
            paths,
            cli_override,
        }
    }

    /// The whisper-cli executable: the configured path, else `PATH`.
    pub fn locate_cli(&self) -> Result<PathBuf, ToolError> {
        if let Some(path) = &self.cli_override {
            return Ok(path.clone());
        }
        which::which(WHISPER_CLI).map_err(|_| ToolError::NotFound {
            tool: WHISPER_CLI.to_string(),
        })
    }

    /// Transcribe `audio` with the installed model `model_key`.
    ///
    /// Returns the recognized text, trimmed.
    pub async fn transcribe(&self, audio: &Path, model_key: &str) -> Result<String, TranscribeError> {
        if !tokio::fs::metadata(audio)
            .await
            .is_ok_and(|m| m.is_file())
        {
            return Err(TranscribeError::AudioNotFound(audio.to_path_buf()));
        }

        if !is_valid_asset_key(model_key) {
            return Err(TranscribeError::ModelNotInstalled(model_key.to_string()));
        }
        let model = self.paths.whisper_model_path(model_key);
        if !tokio::fs::metadata(&model).await.is_ok_and(|m| m.is_file()) {
            return Err(TranscribeError::ModelNotInstalled(model_key.to_string()));
        }

        let cli = self.locate_cli()?;
        info!(audio = %audio.display(), model = model_key, "Transcribing");

        let output = run_tool(
            WHISPER_CLI,
            &cli,
            [
                OsStr::new("-m"),
                model.as_os_str(),
                OsStr::new("-f"),
                audio.as_os_str(),
                OsStr::new("-nt"),
                OsStr::new("-np"),
            ],
            TRANSCRIBE_TIMEOUT,
        )
        .await?;

        Ok(output.stdout.trim().to_string())
    }
}
