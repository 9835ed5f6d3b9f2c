//! Wires a [`VoiceOrchestrator`] for one CLI invocation.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;
use voxkit_core::{AssetPaths, ensure_directory, verify_writable};
use voxkit_core::paths::resource_root;
use voxkit_runtime::VoiceOrchestrator;

/// Resolve asset paths, honoring a `--data-dir` override.
pub fn asset_paths(data_dir: Option<&Path>) -> Result<AssetPaths> {
    let paths = match data_dir {
        Some(dir) => {
            let resources = resource_root().context("Failed to resolve resource directory")?;
            AssetPaths::new(dir, resources)
        }
        None => AssetPaths::from_env().context("Failed to resolve data directory")?,
    };
    Ok(paths)
}

/// Build the orchestrator after checking the data root is usable.
pub fn build_orchestrator(paths: AssetPaths) -> Result<VoiceOrchestrator> {
    debug!(root = %paths.root().display(), "Building orchestrator");
    ensure_directory(paths.root())
        .and_then(|()| verify_writable(paths.root()))
        .context("Data directory is not usable")?;
    VoiceOrchestrator::new(paths).context("Failed to initialize voxkit")
}
