//! Shared fixtures for the runtime integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use voxkit_core::paths::voice_files;
use voxkit_core::{AssetPaths, FixedTempDir};
use voxkit_runtime::install::PiperLocator;
use voxkit_runtime::VoiceOrchestrator;

/// Write an executable shell script.
pub fn write_script(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

/// Install a placeholder voice (both files) into `dir`.
pub fn install_voice(dir: &Path, key: &str) {
    std::fs::create_dir_all(dir).unwrap();
    let (model, config) = voice_files(dir, key);
    std::fs::write(model, b"onnx").unwrap();
    std::fs::write(config, b"{}").unwrap();
}

/// An isolated asset root plus a scratch temp dir.
pub struct Sandbox {
    pub dir: TempDir,
    pub paths: AssetPaths,
}

impl Sandbox {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let paths = AssetPaths::with_root(dir.path().join("data"));
        Self { dir, paths }
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.dir.path().join("tmp")
    }

    pub fn temp_provider(&self) -> Arc<FixedTempDir> {
        Arc::new(FixedTempDir(self.temp_dir()))
    }

    /// Files left in the scratch temp dir.
    pub fn temp_files(&self) -> Vec<PathBuf> {
        match std::fs::read_dir(self.temp_dir()) {
            Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Orchestrator that only looks for Piper under the sandbox root.
    pub fn orchestrator(&self) -> VoiceOrchestrator {
        VoiceOrchestrator::builder(self.paths.clone())
            .temp_dir(self.temp_provider())
            .piper_locator(PiperLocator::managed_only(self.paths.clone()))
            .build()
            .unwrap()
    }
}
