//! Piper binary search policy.
//!
//! First match wins:
//! 1. `<root>/piper/bin/piper/piper` (layout of the release archives)
//! 2. `<root>/piper/bin/piper` (binary placed directly)
//! 3. well-known system install directories
//! 4. `PATH`

use std::path::{Path, PathBuf};

use tracing::debug;
use voxkit_core::AssetPaths;

#[cfg(target_os = "windows")]
const PIPER_BINARY: &str = "piper.exe";
#[cfg(not(target_os = "windows"))]
const PIPER_BINARY: &str = "piper";

/// System directories probed after the managed locations.
#[cfg(unix)]
pub const SYSTEM_BIN_DIRS: &[&str] = &["/usr/local/bin", "/usr/bin", "/opt/homebrew/bin"];
#[cfg(not(unix))]
pub const SYSTEM_BIN_DIRS: &[&str] = &[];

/// Finds the Piper executable.
#[derive(Debug, Clone)]
pub struct PiperLocator {
    paths: AssetPaths,
    system_dirs: Vec<PathBuf>,
    search_path: bool,
}

impl PiperLocator {
    /// Full search policy: managed locations, system dirs, then `PATH`.
    pub fn new(paths: AssetPaths) -> Self {
        Self {
            paths,
            system_dirs: SYSTEM_BIN_DIRS.iter().map(PathBuf::from).collect(),
            search_path: true,
        }
    }

    /// Only the managed locations under the asset root.
    pub const fn managed_only(paths: AssetPaths) -> Self {
        Self {
            paths,
            system_dirs: Vec::new(),
            search_path: false,
        }
    }

    /// Candidate locations, in search order, excluding the `PATH` lookup.
    pub fn candidates(&self) -> Vec<PathBuf> {
        let mut candidates = vec![
            self.paths.piper_primary_binary(),
            self.paths.piper_secondary_binary(),
        ];
        candidates.extend(self.system_dirs.iter().map(|d| d.join(PIPER_BINARY)));
        candidates
    }

    /// The first executable Piper found, if any.
    pub fn locate(&self) -> Option<PathBuf> {
        if let Some(found) = self.candidates().into_iter().find(|p| is_executable(p)) {
            debug!(path = %found.display(), "Found piper");
            return Some(found);
        }

        if self.search_path {
            if let Ok(found) = which::which(PIPER_BINARY) {
                debug!(path = %found.display(), "Found piper on PATH");
                return Some(found);
            }
        }

        None
    }
}

/// A regular file with at least one execute bit (unix) or any regular file.
pub fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }

    #[cfg(not(unix))]
    {
        true
    }
}

/// Mark `path` executable (0o755). No-op where permissions don't apply.
pub fn make_executable(path: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
    }

    #[cfg(not(unix))]
    {
        let _ = path;
        Ok(())
    }
}
