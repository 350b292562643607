//! Persisted Metadata store
//!
//! One JSON file at the destination maps canonical ID → `{ timestamp,
//! resource }` for everything the last successful run synchronized. The file
//! is read once at the start of a run and fully rewritten at commit. Writes
//! go through a temp file and a rename, so the record is never observable
//! half-written.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

use crate::error::{Result, SyncError};
use crate::plan::{DownloadSet, SyncedResource};

/// The durable record of what was last successfully synchronized
pub type PersistedMetadata = BTreeMap<String, SyncedResource>;

/// Read the metadata file; an absent file is an empty record, not an error
pub async fn read(path: &Path) -> Result<PersistedMetadata> {
    match tokio::fs::read(path).await {
        Ok(bytes) => {
            let record: PersistedMetadata = serde_json::from_slice(&bytes).map_err(|e| {
                SyncError::Metadata(format!("cannot parse {}: {}", path.display(), e))
            })?;
            debug!(
                path = %path.display(),
                entries = record.len(),
                "loaded existing sync metadata"
            );
            Ok(record)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(PersistedMetadata::new()),
        Err(e) => Err(SyncError::Metadata(format!(
            "cannot read {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Rewrite the metadata file to equal the given download set
///
/// Serialized deterministically (the set is ordered), written to a sibling
/// temp file, then renamed into place.
pub async fn write(path: &Path, temporary_prefix: &str, set: &DownloadSet) -> Result<()> {
    let body = serde_json::to_vec_pretty(set)
        .map_err(|e| SyncError::Commit(format!("cannot serialize metadata: {}", e)))?;

    let file_name = path
        .file_name()
        .ok_or_else(|| SyncError::Commit(format!("bad metadata path {}", path.display())))?
        .to_string_lossy()
        .to_string();
    let temp_path = path.with_file_name(format!("{}{}", temporary_prefix, file_name));

    tokio::fs::write(&temp_path, &body).await.map_err(|e| {
        SyncError::Commit(format!("cannot write {}: {}", temp_path.display(), e))
    })?;
    tokio::fs::rename(&temp_path, path).await.map_err(|e| {
        SyncError::Commit(format!(
            "cannot move metadata into place at {}: {}",
            path.display(),
            e
        ))
    })?;

    debug!(path = %path.display(), entries = set.len(), "sync metadata written");
    Ok(())
}
