//! Engine processes and installers for voxkit.
//!
//! - [`install`]: Piper, voice and whisper model installers, Piper lookup
//! - [`speech`]: Piper synthesis with stop support
//! - [`clone`]: XTTS voice cloning and the inference server bridge
//! - [`transcribe`]: whisper.cpp transcription
//! - [`orchestrator`]: [`VoiceOrchestrator`], which owns all of the above

#![deny(unused_crate_dependencies)]

mod cleanup;
pub mod clone;
mod error;
pub mod install;
pub mod orchestrator;
pub mod shutdown;
pub mod speech;
pub mod tool;
pub mod transcribe;

pub use error::{CloneError, InstallError, SpeechError, ToolError, TranscribeError};
pub use orchestrator::{OrchestratorBuilder, VoiceOrchestrator};
pub use speech::{SpeechSynthesizer, SynthesizedAudio};

// Only the integration tests in tests/ use these on every platform
#[cfg(test)]
use flate2 as _;
#[cfg(test)]
use tar as _;
#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use wiremock as _;
