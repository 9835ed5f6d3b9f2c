//! Speak command handler.
//!
//! Ctrl-C stops the utterance; Piper and its temp file are cleaned up
//! before the command returns.

use std::path::Path;

use anyhow::{Context, Result};
use voxkit_runtime::VoiceOrchestrator;
use voxkit_runtime::speech::decode_to_file;

pub async fn execute(
    voxkit: &VoiceOrchestrator,
    text: &str,
    voice: Option<&str>,
    speed: Option<f32>,
    out: &Path,
) -> Result<()> {
    let speaking = voxkit.speak(text, voice, speed);
    tokio::pin!(speaking);

    let audio = tokio::select! {
        result = &mut speaking => result,
        _ = tokio::signal::ctrl_c() => {
            voxkit.stop();
            speaking.await
        }
    }
    .context("Speech synthesis failed")?;

    decode_to_file(&audio, out)?;
    println!("Spoke with {} -> {}", audio.voice, out.display());
    Ok(())
}
