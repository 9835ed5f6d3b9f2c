//! Tabular output for voices, models and clones.

pub mod json;
pub mod tables;

pub use json::{json_envelope, print_json};
pub use tables::{format_optional, print_separator, truncate_string};

use voxkit_core::InstalledVoice;
use voxkit_runtime::clone::XttsVoice;
use voxkit_voice::{VoiceCatalogEntry, WhisperModel};

pub fn print_installed_voices(voices: &[InstalledVoice], selected: Option<&str>) {
    if voices.is_empty() {
        println!("No voices installed. Try `voxkit voices install en_US-amy-medium`.");
        return;
    }
    println!("  {:<36} {:<24} {:<10} {:<8}", "KEY", "NAME", "SOURCE", "QUALITY");
    print_separator(82);
    for voice in voices {
        let marker = if selected == Some(voice.key.as_str()) { "*" } else { " " };
        println!(
            "{marker} {:<36} {:<24} {:<10} {:<8}",
            truncate_string(&voice.key, 36),
            truncate_string(&voice.name, 24),
            voice.source,
            format_optional(voice.quality.as_deref(), "-"),
        );
    }
}

pub fn print_catalog(entries: &[&VoiceCatalogEntry]) {
    if entries.is_empty() {
        println!("No matching voices in the catalog.");
        return;
    }
    println!("{:<36} {:<8} {:<24} {:<8} {:>8}", "KEY", "LANG", "LANGUAGE", "QUALITY", "SPEAKERS");
    print_separator(88);
    for entry in entries {
        println!(
            "{:<36} {:<8} {:<24} {:<8} {:>8}",
            truncate_string(&entry.key, 36),
            entry.language.code,
            truncate_string(&entry.language.name_english, 24),
            entry.quality,
            entry.num_speakers,
        );
    }
    println!("\n{} voice(s)", entries.len());
}

pub fn print_whisper_models(models: &[WhisperModel], installed: &[String], selected: Option<&str>) {
    println!("  {:<16} {:<26} {:>8} {:<10}", "KEY", "NAME", "SIZE", "STATUS");
    print_separator(64);
    for model in models {
        let marker = if selected == Some(model.key) { "*" } else { " " };
        let status = if installed.iter().any(|k| k == model.key) {
            "installed"
        } else if model.is_default {
            "default"
        } else {
            ""
        };
        println!(
            "{marker} {:<16} {:<26} {:>8} {:<10}",
            model.key, model.name, model.size_display, status
        );
    }
}

pub fn print_clones(voices: &[XttsVoice]) {
    if voices.is_empty() {
        println!("No cloned voices. Try `voxkit clone sample en_sample`.");
        return;
    }
    println!("{:<20} {:<24} {:<6} {:<20}", "ID", "NAME", "LANG", "CREATED");
    print_separator(72);
    for voice in voices {
        println!(
            "{:<20} {:<24} {:<6} {:<20}",
            truncate_string(&voice.id, 20),
            truncate_string(&voice.name, 24),
            voice.language,
            voice.created_at.format("%Y-%m-%d %H:%M"),
        );
    }
}
