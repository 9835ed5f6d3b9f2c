//! Transcription model command handlers.

use anyhow::{Context, Result};
use voxkit_runtime::VoiceOrchestrator;
use voxkit_voice::WHISPER_MODELS;

use crate::commands::WhisperCommand;
use crate::presentation::print_whisper_models;
use crate::utils::CliProgress;

pub async fn execute(voxkit: &VoiceOrchestrator, command: WhisperCommand) -> Result<()> {
    match command {
        WhisperCommand::List => {
            let status = voxkit.transcription_status().await?;
            print_whisper_models(WHISPER_MODELS, &status.available, status.selected.as_deref());
        }
        WhisperCommand::Install { key } => {
            let progress = CliProgress::new();
            match voxkit.install_whisper_model(&key, &progress).await {
                Ok(path) => {
                    progress.finish();
                    println!("Installed {key} to {}", path.display());
                }
                Err(e) => {
                    progress.abandon();
                    return Err(e).with_context(|| format!("Failed to install model {key}"));
                }
            }
        }
        WhisperCommand::Select { key } => {
            voxkit.select_whisper_model(&key).await?;
            println!("Selected {key}");
        }
        WhisperCommand::Remove { key } => {
            voxkit
                .remove_whisper_model(&key)
                .await
                .with_context(|| format!("Failed to remove model {key}"))?;
            println!("Removed {key}");
        }
        WhisperCommand::Status => {
            let status = voxkit.transcription_status().await?;
            if status.installed {
                println!("Installed: {}", status.available.join(", "));
            } else {
                println!("Installed: none (run `voxkit whisper install base.en`)");
            }
            match status.selected {
                Some(selected) => println!("Selected:  {selected}"),
                None => println!("Selected:  none"),
            }
        }
    }
    Ok(())
}
