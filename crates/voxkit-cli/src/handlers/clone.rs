//! Cloned voice command handlers.

use anyhow::{Context, Result};
use voxkit_runtime::VoiceOrchestrator;
use voxkit_runtime::clone::{SAMPLE_VOICES, XttsOptions};
use voxkit_runtime::speech::decode_to_file;

use crate::commands::CloneCommand;
use crate::presentation::{print_clones, print_json};
use crate::utils::CliProgress;

pub async fn execute(voxkit: &VoiceOrchestrator, command: CloneCommand) -> Result<()> {
    match command {
        CloneCommand::Create {
            name,
            reference,
            language,
        } => {
            let voice = voxkit.create_clone(&name, &reference, &language).await?;
            println!("Created {} ({})", voice.name, voice.id);
        }
        CloneCommand::Import {
            media,
            name,
            start,
            end,
            language,
        } => {
            let voice = voxkit
                .import_clone_from_media(&media, &name, &language, start, end)
                .await
                .with_context(|| format!("Failed to import a clip from {}", media.display()))?;
            println!("Created {} ({}) from {:.1}s-{:.1}s", voice.name, voice.id, start, end);
        }
        CloneCommand::Sample { id: None } => {
            for sample in SAMPLE_VOICES {
                println!("{:<12} {:<20} {}", sample.id, sample.name, sample.language);
            }
        }
        CloneCommand::Sample { id: Some(id) } => {
            let progress = CliProgress::new();
            match voxkit.download_sample_voice(&id, &progress).await {
                Ok(voice) => {
                    progress.finish();
                    println!("Created {} ({})", voice.name, voice.id);
                }
                Err(e) => {
                    progress.abandon();
                    return Err(e).with_context(|| format!("Failed to download sample {id}"));
                }
            }
        }
        CloneCommand::List { json } => {
            let voices = voxkit.list_clones().await;
            if json {
                print_json(voices)?;
            } else {
                print_clones(&voices?);
            }
        }
        CloneCommand::Delete { id } => {
            voxkit.delete_clone(&id).await?;
            println!("Deleted {id}");
        }
        CloneCommand::Speak {
            id,
            text,
            out,
            temperature,
            speed,
        } => {
            let defaults = XttsOptions::default();
            let options = XttsOptions {
                temperature: temperature.unwrap_or(defaults.temperature),
                speed: speed.unwrap_or(defaults.speed),
                ..defaults
            };
            let audio = voxkit
                .speak_clone(&id, &text, options)
                .await
                .context("Cloned voice synthesis failed")?;
            decode_to_file(&audio, &out)?;
            println!("Spoke with {} -> {}", audio.voice, out.display());
        }
    }
    Ok(())
}
