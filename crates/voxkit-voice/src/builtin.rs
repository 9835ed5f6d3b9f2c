//! Voices the application knows by name.
//!
//! These may ship in the bundled resource directory or be downloaded on
//! demand; either way they are listed first and carry a friendly name.

/// A well-known Piper voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinVoice {
    pub key: &'static str,
    pub name: &'static str,
}

/// Known voices, in display order. The first one is the default.
pub const BUILTIN_VOICES: &[BuiltinVoice] = &[
    BuiltinVoice {
        key: "en_US-amy-medium",
        name: "Amy (US English)",
    },
    BuiltinVoice {
        key: "en_US-lessac-medium",
        name: "Lessac (US English)",
    },
    BuiltinVoice {
        key: "en_US-ryan-high",
        name: "Ryan (US English)",
    },
    BuiltinVoice {
        key: "en_GB-alan-medium",
        name: "Alan (British English)",
    },
    BuiltinVoice {
        key: "de_DE-thorsten-medium",
        name: "Thorsten (German)",
    },
    BuiltinVoice {
        key: "es_ES-davefx-medium",
        name: "Davefx (Spanish)",
    },
    BuiltinVoice {
        key: "fr_FR-siwis-medium",
        name: "Siwis (French)",
    },
];

/// Find a known voice by key.
pub fn find_builtin(key: &str) -> Option<&'static BuiltinVoice> {
    BUILTIN_VOICES.iter().find(|v| v.key == key)
}

/// Piper quality tiers, as used in the last segment of a voice key.
const QUALITIES: &[&str] = &["x_low", "low", "medium", "high"];

/// Split a voice key such as `en_US-amy-medium` into `(language, quality)`.
///
/// Either part is `None` when the key doesn't follow the
/// `<lang>_<REGION>-<speaker>-<quality>` convention.
pub fn parse_voice_key(key: &str) -> (Option<String>, Option<String>) {
    let language = key
        .split('-')
        .next()
        .filter(|lang| lang.contains('_') && key.contains('-'))
        .map(str::to_string);
    let quality = key
        .rsplit('-')
        .next()
        .filter(|q| QUALITIES.contains(q))
        .map(str::to_string);
    (language, quality)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_keys_are_unique() {
        for (i, a) in BUILTIN_VOICES.iter().enumerate() {
            assert!(BUILTIN_VOICES.iter().skip(i + 1).all(|b| b.key != a.key));
        }
    }

    #[test]
    fn parses_language_and_quality() {
        assert_eq!(
            parse_voice_key("en_US-amy-medium"),
            (Some("en_US".into()), Some("medium".into()))
        );
        assert_eq!(
            parse_voice_key("de_DE-thorsten_emotional-x_low"),
            (Some("de_DE".into()), Some("x_low".into()))
        );
        assert_eq!(parse_voice_key("myvoice"), (None, None));
        assert_eq!(parse_voice_key("en_US-odd-ultra"), (Some("en_US".into()), None));
    }
}
