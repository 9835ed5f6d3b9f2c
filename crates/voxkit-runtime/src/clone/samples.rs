//! Public reference recordings that can seed a cloned voice.

/// Where the sample recordings are published.
pub const SAMPLES_BASE_URL: &str = "https://huggingface.co/coqui/XTTS-v2/resolve/main/samples";

/// A downloadable reference recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleVoice {
    pub id: &'static str,
    pub name: &'static str,
    pub language: &'static str,
    pub file: &'static str,
}

pub const SAMPLE_VOICES: &[SampleVoice] = &[
    SampleVoice {
        id: "en_sample",
        name: "English Sample",
        language: "en",
        file: "en_sample.wav",
    },
    SampleVoice {
        id: "de_sample",
        name: "German Sample",
        language: "de",
        file: "de_sample.wav",
    },
    SampleVoice {
        id: "es_sample",
        name: "Spanish Sample",
        language: "es",
        file: "es_sample.wav",
    },
    SampleVoice {
        id: "fr_sample",
        name: "French Sample",
        language: "fr",
        file: "fr_sample.wav",
    },
    SampleVoice {
        id: "pt_sample",
        name: "Portuguese Sample",
        language: "pt",
        file: "pt_sample.wav",
    },
    SampleVoice {
        id: "tr_sample",
        name: "Turkish Sample",
        language: "tr",
        file: "tr_sample.wav",
    },
];

pub fn find_sample(id: &str) -> Option<&'static SampleVoice> {
    SAMPLE_VOICES.iter().find(|s| s.id == id)
}
