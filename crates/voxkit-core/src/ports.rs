//! Narrow contracts consumed from the surrounding application.
//!
//! The UI shell supplies these; voxkit ships simple defaults so the CLI and
//! tests can run without one.

use std::path::PathBuf;

/// Receives `(status, percent?)` updates from long-running operations.
///
/// Percentages reported within one operation never decrease.
pub trait ProgressSink: Send + Sync {
    fn report(&self, message: &str, percent: Option<u8>);
}

impl<F> ProgressSink for F
where
    F: Fn(&str, Option<u8>) + Send + Sync,
{
    fn report(&self, message: &str, percent: Option<u8>) {
        self(message, percent);
    }
}

/// A progress sink that ignores all updates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn report(&self, _message: &str, _percent: Option<u8>) {}
}

/// Supplies the directory used for short-lived files such as synthesized audio.
pub trait TempDirProvider: Send + Sync {
    fn temp_dir(&self) -> PathBuf;
}

/// Uses the operating system temp directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTempDir;

impl TempDirProvider for SystemTempDir {
    fn temp_dir(&self) -> PathBuf {
        std::env::temp_dir()
    }
}

/// A fixed temp directory, mostly useful for tests.
#[derive(Debug, Clone)]
pub struct FixedTempDir(pub PathBuf);

impl TempDirProvider for FixedTempDir {
    fn temp_dir(&self) -> PathBuf {
        self.0.clone()
    }
}

/// Asks the user for a file. Returns an absolute path, or `None` if cancelled.
pub trait FilePicker: Send + Sync {
    fn pick_file(&self, title: &str, extensions: &[&str]) -> Option<PathBuf>;
}
