//! Best-effort removal of partial and temporary files.

use std::path::Path;

use tracing::warn;

/// Remove `path`, logging anything other than "already gone".
pub async fn remove_quietly(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "Failed to remove file");
        }
    }
}
