//! Piper voice command handlers.

use anyhow::{Context, Result};
use voxkit_core::SettingsUpdate;
use voxkit_runtime::VoiceOrchestrator;

use crate::commands::VoicesCommand;
use crate::presentation::{print_installed_voices, print_json};
use crate::utils::{CliProgress, LinePicker};

pub async fn execute(voxkit: &VoiceOrchestrator, command: VoicesCommand) -> Result<()> {
    match command {
        VoicesCommand::List { json } => {
            let voices = voxkit.list_voices().await;
            if json {
                print_json(voices)?;
            } else {
                let voices = voices?;
                let selected = voxkit.load_settings().ok().and_then(|s| s.selected_voice);
                print_installed_voices(&voices, selected.as_deref());
            }
        }
        VoicesCommand::Install { key } => {
            let progress = CliProgress::new();
            let result = voxkit.install_voice(&key, &progress).await;
            match result {
                Ok(paths) => {
                    progress.finish();
                    println!("Installed {key} to {}", paths.model.display());
                }
                Err(e) => {
                    progress.abandon();
                    return Err(e).with_context(|| format!("Failed to install voice {key}"));
                }
            }
        }
        VoicesCommand::Import { model, name } => {
            let imported = match model {
                Some(model) => Some(voxkit.import_custom_voice(&model, name.as_deref()).await?),
                None => {
                    voxkit
                        .import_voice_with_picker(&LinePicker::stdin(), name.as_deref())
                        .await?
                }
            };
            match imported {
                Some(voice) => println!("Imported {} as {}", voice.name, voice.key),
                None => println!("Import cancelled."),
            }
        }
        VoicesCommand::Remove { key } => {
            voxkit
                .remove_voice(&key)
                .await
                .with_context(|| format!("Failed to remove voice {key}"))?;
            println!("Removed {key}");
        }
        VoicesCommand::Select { key } => {
            if voxkit.resolve_voice(&key).await.is_none() {
                anyhow::bail!("Voice {key} is not installed");
            }
            voxkit.update_settings(&SettingsUpdate {
                selected_voice: Some(Some(key.clone())),
                ..SettingsUpdate::default()
            })?;
            println!("Selected {key}");
        }
    }
    Ok(())
}
