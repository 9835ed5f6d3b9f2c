//! Tracing setup for the CLI.
//!
//! Logs go to stderr and to a daily rolling file under `<root>/logs`. The
//! level comes from `RUST_LOG`, defaulting to `info` (`debug` with
//! `--verbose`).

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use voxkit_core::{AssetPaths, ensure_directory};

/// Install the global subscriber.
///
/// The returned guard flushes the file writer when dropped, so `main` must
/// hold it until exit. `None` means the log directory was unusable and only
/// stderr is active.
pub fn init(paths: &AssetPaths, verbose: bool) -> Option<WorkerGuard> {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let log_dir = paths.logs_dir();
    let (file_layer, guard) = match ensure_directory(&log_dir) {
        Ok(()) => {
            let prefix = paths
                .log_file()
                .file_name()
                .map_or_else(|| "voxkit.log".into(), |n| n.to_owned());
            let file_appender = tracing_appender::rolling::daily(&log_dir, prefix);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .compact();
            (Some(layer), Some(guard))
        }
        Err(e) => {
            eprintln!("Failed to create log directory {}: {e}", log_dir.display());
            (None, None)
        }
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .ok();

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_layer_needs_a_log_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = AssetPaths::with_root(tmp.path().join("data"));
        let guard = init(&paths, false);
        assert!(guard.is_some());
        assert!(paths.logs_dir().is_dir());

        let blocked = AssetPaths::with_root(tmp.path().join("blocked"));
        std::fs::create_dir_all(blocked.root()).unwrap();
        std::fs::write(blocked.logs_dir(), b"not a directory").unwrap();
        assert!(init(&blocked, false).is_none());
    }
}
