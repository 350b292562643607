//! Commit & Reconcile
//!
//! Invoked only after every download succeeded. Promotion renames each
//! staged temp file to its final name (the sole mutation of a live
//! filename), then the metadata file is rewritten from the full download
//! set. Reconciliation, when enabled, deletes destination files that are
//! neither in the set nor the metadata file itself; individual deletion
//! failures are warnings, not errors.

use tracing::{debug, info, warn};

use crate::config::SyncOptions;
use crate::error::{CleanupWarning, Result, SyncError};
use crate::metadata;
use crate::plan::DownloadSet;

/// Promote staged downloads and persist the new metadata record
pub async fn commit(downloaded: &[String], set: &DownloadSet, options: &SyncOptions) -> Result<()> {
    for id in downloaded {
        let from = options.temp_path(id);
        let to = options.final_path(id);
        debug!(id = %id, to = %to.display(), "promoting downloaded file");
        tokio::fs::rename(&from, &to).await.map_err(|e| {
            SyncError::Commit(format!(
                "cannot promote {} to {}: {}",
                from.display(),
                to.display(),
                e
            ))
        })?;
    }

    metadata::write(&options.metadata_path(), &options.temporary_prefix, set).await
}

/// Delete destination files that are not part of the accepted set
///
/// The retain set is the download set's canonical IDs plus the metadata
/// filename; everything else in the destination directory is unlinked.
/// Returns the number of deletions and any non-fatal warnings.
pub async fn reconcile(set: &DownloadSet, options: &SyncOptions) -> (usize, Vec<CleanupWarning>) {
    info!("cleaning up unlisted destination files");
    let mut deleted = 0;
    let mut warnings = Vec::new();

    let mut entries = match tokio::fs::read_dir(options.destination()).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "cannot list destination directory");
            warnings.push(CleanupWarning {
                path: options.destination().to_path_buf(),
                reason: format!("cannot list directory: {}", e),
            });
            return (0, warnings);
        }
    };

    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warnings.push(CleanupWarning {
                    path: options.destination().to_path_buf(),
                    reason: format!("directory listing aborted: {}", e),
                });
                break;
            }
        };

        let name = entry.file_name().to_string_lossy().to_string();
        if name == options.metadata_file || set.contains_key(&name) {
            continue;
        }

        let path = entry.path();
        warn!(path = %path.display(), "deleting unlisted file");
        match tokio::fs::remove_file(&path).await {
            Ok(()) => deleted += 1,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not delete unlisted file");
                warnings.push(CleanupWarning {
                    path,
                    reason: e.to_string(),
                });
            }
        }
    }

    if deleted == 0 && warnings.is_empty() {
        info!("nothing to clean up");
    } else {
        info!(deleted, warnings = warnings.len(), "cleanup finished");
    }
    (deleted, warnings)
}
