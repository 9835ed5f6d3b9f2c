//! Command handlers. Each delegates to the orchestrator and formats output.

pub mod catalog;
pub mod clone;
pub mod paths;
pub mod piper;
pub mod speak;
pub mod transcribe;
pub mod voices;
pub mod whisper;

use anyhow::Result;
use voxkit_runtime::VoiceOrchestrator;

use crate::commands::Commands;

/// Route a parsed command to its handler.
pub async fn dispatch(voxkit: &VoiceOrchestrator, command: Commands) -> Result<()> {
    match command {
        Commands::Paths => {
            paths::execute(voxkit.paths());
            Ok(())
        }
        Commands::Catalog { refresh, language } => {
            catalog::execute(voxkit, refresh, language.as_deref()).await
        }
        Commands::Voices(cmd) => voices::execute(voxkit, cmd).await,
        Commands::Piper(cmd) => piper::execute(voxkit, cmd).await,
        Commands::Speak {
            text,
            voice,
            speed,
            out,
        } => speak::execute(voxkit, &text, voice.as_deref(), speed, &out).await,
        Commands::Whisper(cmd) => whisper::execute(voxkit, cmd).await,
        Commands::Transcribe { audio, model } => {
            transcribe::execute(voxkit, &audio, model.as_deref()).await
        }
        Commands::Clone(cmd) => clone::execute(voxkit, cmd).await,
    }
}
