//! Catalog command handler.

use anyhow::{Context, Result};
use voxkit_runtime::VoiceOrchestrator;
use voxkit_voice::VoiceCatalogEntry;

use crate::presentation::print_catalog;

pub async fn execute(
    voxkit: &VoiceOrchestrator,
    refresh: bool,
    language: Option<&str>,
) -> Result<()> {
    let catalog = voxkit
        .fetch_catalog(refresh)
        .await
        .context("Failed to load the voice catalog")?;

    let entries: Vec<&VoiceCatalogEntry> = catalog
        .iter()
        .filter(|entry| language.is_none_or(|lang| matches_language(entry, lang)))
        .collect();
    print_catalog(&entries);
    Ok(())
}

/// Case-insensitive prefix match on the language code (`en` matches `en_GB`).
fn matches_language(entry: &VoiceCatalogEntry, prefix: &str) -> bool {
    entry
        .language
        .code
        .to_lowercase()
        .starts_with(&prefix.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(code: &str) -> VoiceCatalogEntry {
        serde_json::from_value(serde_json::json!({
            "key": format!("{code}-test-low"),
            "name": "test",
            "language": { "code": code }
        }))
        .unwrap()
    }

    #[test]
    fn language_filter_is_a_case_insensitive_prefix() {
        assert!(matches_language(&entry("en_GB"), "en"));
        assert!(matches_language(&entry("en_GB"), "EN_gb"));
        assert!(!matches_language(&entry("de_DE"), "en"));
    }
}
