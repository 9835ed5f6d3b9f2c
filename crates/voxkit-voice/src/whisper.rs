//! Curated whisper.cpp GGML models for transcription.

use serde::Serialize;

/// Repository that `ggml-<key>.bin` files are published in.
pub const WHISPER_MODELS_BASE_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

/// A downloadable whisper.cpp model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhisperModel {
    /// Model key, e.g. `base.en`. The file is `ggml-<key>.bin`.
    pub key: &'static str,
    pub name: &'static str,
    /// Approximate download size, for display.
    pub size_bytes: u64,
    pub size_display: &'static str,
    /// English-only models are faster but cannot transcribe other languages.
    pub english_only: bool,
    pub is_default: bool,
}

impl WhisperModel {
    pub fn file_name(&self) -> String {
        format!("ggml-{}.bin", self.key)
    }

    pub fn url(&self) -> String {
        format!("{WHISPER_MODELS_BASE_URL}/{}", self.file_name())
    }
}

const fn model(
    key: &'static str,
    name: &'static str,
    size_bytes: u64,
    size_display: &'static str,
    english_only: bool,
    is_default: bool,
) -> WhisperModel {
    WhisperModel {
        key,
        name,
        size_bytes,
        size_display,
        english_only,
        is_default,
    }
}

/// All known models, smallest first within each language group.
pub const WHISPER_MODELS: &[WhisperModel] = &[
    model("tiny.en", "Tiny (English)", 77_691_713, "75 MB", true, false),
    model("base.en", "Base (English)", 147_951_465, "142 MB", true, true),
    model("small.en", "Small (English)", 487_601_817, "466 MB", true, false),
    model("medium.en", "Medium (English)", 1_533_774_781, "1.5 GB", true, false),
    model("tiny", "Tiny (Multilingual)", 77_691_713, "75 MB", false, false),
    model("base", "Base (Multilingual)", 147_964_211, "142 MB", false, false),
    model("small", "Small (Multilingual)", 487_626_545, "466 MB", false, false),
    model(
        "large-v3-turbo",
        "Large V3 Turbo (Multilingual)",
        1_622_081_457,
        "1.5 GB",
        false,
        false,
    ),
    // Quantized variants
    model("base.en-q5_0", "Base Q5_0 (English)", 57_348_577, "55 MB", true, false),
    model(
        "large-v3-turbo-q5_0",
        "Large V3 Turbo Q5_0",
        574_041_889,
        "548 MB",
        false,
        false,
    ),
];

/// Find a model by key.
pub fn find_whisper_model(key: &str) -> Option<&'static WhisperModel> {
    WHISPER_MODELS.iter().find(|m| m.key == key)
}

/// The recommended model.
pub fn default_whisper_model() -> &'static WhisperModel {
    WHISPER_MODELS
        .iter()
        .find(|m| m.is_default)
        .unwrap_or(&WHISPER_MODELS[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_default() {
        assert_eq!(WHISPER_MODELS.iter().filter(|m| m.is_default).count(), 1);
        assert_eq!(default_whisper_model().key, "base.en");
    }

    #[test]
    fn urls_point_at_ggml_files() {
        let m = find_whisper_model("base.en").unwrap();
        assert_eq!(
            m.url(),
            "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-base.en.bin"
        );
        assert!(find_whisper_model("huge").is_none());
    }
}
