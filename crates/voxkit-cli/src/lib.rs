//! The `voxkit` command-line adapter.
//!
//! Parsing lives in [`parser`] and [`commands`]; each subcommand has a
//! handler that delegates to a [`voxkit_runtime::VoiceOrchestrator`].

#![deny(unused_crate_dependencies)]

// Used by main.rs
use dotenvy as _;

pub mod bootstrap;
pub mod commands;
pub mod handlers;
pub mod logging;
pub mod parser;
pub mod presentation;
pub mod utils;

pub use bootstrap::{asset_paths, build_orchestrator};
pub use commands::{CloneCommand, Commands, PiperCommand, VoicesCommand, WhisperCommand};
pub use parser::Cli;
