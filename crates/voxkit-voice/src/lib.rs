//! Piper voice management for voxkit.
//!
//! - [`catalog`]: the remote `voices.json` manifest behind a TTL cache
//! - [`library`]: discovery of installed voices and the resolution cascade
//! - [`builtin`]: the table of voices the application knows by name
//! - [`whisper`]: curated transcription models

#![deny(unused_crate_dependencies)]

pub mod builtin;
pub mod catalog;
mod error;
pub mod library;
pub mod whisper;

pub use builtin::{BUILTIN_VOICES, BuiltinVoice, find_builtin, parse_voice_key};
pub use catalog::{
    CatalogCache, CatalogSource, DEFAULT_CATALOG_URL, DEFAULT_TTL, HttpCatalogSource,
    VoiceCatalogEntry, VoiceFile, VoiceLanguage, voice_file_url,
};
pub use error::{CatalogError, LibraryError};
pub use library::{CUSTOM_PREFIX, CustomVoiceMetadata, ResolvedVoice, VoiceLibrary};
pub use whisper::{
    WHISPER_MODELS, WHISPER_MODELS_BASE_URL, WhisperModel, default_whisper_model,
    find_whisper_model,
};

// tempfile is only used by the integration tests in tests/
#[cfg(test)]
use tempfile as _;
