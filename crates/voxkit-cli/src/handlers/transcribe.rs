//! Transcribe command handler.

use std::path::Path;

use anyhow::{Context, Result};
use voxkit_runtime::VoiceOrchestrator;

pub async fn execute(voxkit: &VoiceOrchestrator, audio: &Path, model: Option<&str>) -> Result<()> {
    let text = voxkit
        .transcribe(audio, model)
        .await
        .with_context(|| format!("Failed to transcribe {}", audio.display()))?;
    println!("{text}");
    Ok(())
}
