//! Piper engine command handlers.

use anyhow::{Context, Result};
use voxkit_runtime::VoiceOrchestrator;
use voxkit_runtime::install::{PIPER_RELEASE, current_platform_id};

use crate::commands::PiperCommand;
use crate::utils::CliProgress;

pub async fn execute(voxkit: &VoiceOrchestrator, command: PiperCommand) -> Result<()> {
    match command {
        PiperCommand::Install { platform } => {
            let progress = CliProgress::new();
            match voxkit.install_piper(platform.as_deref(), &progress).await {
                Ok(path) => {
                    progress.finish();
                    println!("Piper {PIPER_RELEASE} installed at {}", path.display());
                }
                Err(e) => {
                    progress.abandon();
                    return Err(e).context("Failed to install Piper");
                }
            }
        }
        PiperCommand::Status => {
            let status = voxkit.piper_status();
            println!("Platform:  {}", current_platform_id());
            match status.path {
                Some(path) => println!("Installed: yes ({})", path.display()),
                None => println!("Installed: no (run `voxkit piper install`)"),
            }
            let voices = voxkit.synthesis_status().await?;
            println!("Voices:    {}", voices.available.len());
            if let Some(selected) = voices.selected {
                println!("Selected:  {selected}");
            }
        }
    }
    Ok(())
}
