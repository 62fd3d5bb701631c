//! Filesystem access for store files
//!
//! Every failure is logged here and turned into `false`/`None`; callers
//! never see an I/O error from these helpers.

use std::path::{Path, PathBuf};

use tracing::{debug, error};

/// Whether `path` exists (unknown counts as missing)
pub async fn exists(path: &Path) -> bool {
    match tokio::fs::try_exists(path).await {
        Ok(found) => found,
        Err(e) => {
            error!("Failed to check {}: {}", path.display(), e);
            false
        }
    }
}

/// Read a UTF-8 file
pub async fn read_text(path: &Path) -> Option<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Some(contents),
        Err(e) => {
            error!("Failed to read {}: {}", path.display(), e);
            None
        }
    }
}

/// Write `contents` through a sibling temp file renamed over the target
///
/// An interrupted write leaves the previous version of `path` in place.
pub async fn write_text(path: &Path, contents: &str) -> bool {
    let tmp = temp_path(path);
    if let Err(e) = tokio::fs::write(&tmp, contents).await {
        error!("Failed to write {}: {}", tmp.display(), e);
        return false;
    }
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        error!("Failed to replace {}: {}", path.display(), e);
        let _ = tokio::fs::remove_file(&tmp).await;
        return false;
    }
    debug!("Wrote {} bytes to {}", contents.len(), path.display());
    true
}

/// Create a directory and any missing parents
pub async fn create_dir(path: &Path) -> bool {
    match tokio::fs::create_dir_all(path).await {
        Ok(()) => true,
        Err(e) => {
            error!("Failed to create directory {}: {}", path.display(), e);
            false
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
