//! Core domain types, asset paths and ports for voxkit.
//!
//! This crate has no network or process dependencies. Adapter crates build
//! on it: `voxkit-download` (HTTP + archives), `voxkit-voice` (catalog and
//! voice discovery), `voxkit-runtime` (installers and engine processes).

#![deny(unused_crate_dependencies)]

pub mod contracts;
pub mod domain;
pub mod paths;
pub mod ports;
pub mod settings;

pub use contracts::CommandResult;
pub use domain::{EngineStatus, InstalledVoice, ModelStatus, VoicePaths, VoiceSource};
pub use paths::{AssetPaths, PathError, ensure_directory, verify_writable};
pub use ports::{
    FilePicker, FixedTempDir, NoopProgress, ProgressSink, SystemTempDir, TempDirProvider,
};
pub use settings::{Settings, SettingsError, SettingsStore, SettingsUpdate};
