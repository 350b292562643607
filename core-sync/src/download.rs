//! Download Orchestrator
//!
//! Fetches the entries of a download set that are newer than the persisted
//! record, each to a temp file inside the destination directory. Downloads
//! run with bounded concurrency; the first failure fails the run, and
//! nothing is promoted to a final filename here — that is the commit's job.

use futures_util::stream::{self, StreamExt, TryStreamExt};
use provider_ckan::CkanConnector;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::config::SyncOptions;
use crate::error::{Result, SyncError};
use crate::metadata::PersistedMetadata;
use crate::plan::DownloadSet;

/// What the orchestrator did with the download set
#[derive(Debug, Clone, Default)]
pub struct DownloadOutcome {
    /// IDs fetched to temp files this run, awaiting promotion
    pub downloaded: Vec<String>,

    /// IDs whose local copy is already current (prior timestamp ≥ planned)
    pub kept: Vec<String>,
}

/// Download every entry of `set` that is strictly newer than `prior`
///
/// # Errors
///
/// The first failed fetch or temp-file write aborts the remaining queue and
/// returns [`SyncError::Download`]; temp files already staged are left for a
/// later cleanup pass and are never promoted.
pub async fn run(
    set: &DownloadSet,
    prior: &PersistedMetadata,
    connector: &CkanConnector,
    options: &SyncOptions,
) -> Result<DownloadOutcome> {
    let mut kept = Vec::new();
    let mut pending = Vec::new();

    for (id, entry) in set {
        match prior.get(id) {
            Some(prev) if entry.timestamp <= prev.timestamp => {
                debug!(%id, "not newer than existing download, keeping local copy");
                kept.push(id.clone());
            }
            _ => pending.push((id.clone(), entry.resource.url.clone())),
        }
    }

    if pending.is_empty() {
        info!("nothing to download, all resources current");
        return Ok(DownloadOutcome {
            downloaded: Vec::new(),
            kept,
        });
    }

    let width = options.max_concurrent_downloads.max(1);
    let downloaded = stream::iter(
        pending
            .into_iter()
            .map(|(id, url)| fetch_one(connector, options, id, url)),
    )
    .buffered(width)
    .try_collect::<Vec<String>>()
    .await?;

    Ok(DownloadOutcome { downloaded, kept })
}

/// Fetch one resource body to its temp file
async fn fetch_one(
    connector: &CkanConnector,
    options: &SyncOptions,
    id: String,
    url: String,
) -> Result<String> {
    info!(id = %id, url = %url, "downloading resource");

    let io = async {
        let mut reader = connector
            .download_resource(&url)
            .await
            .map_err(|e| SyncError::Download {
                id: id.clone(),
                reason: e.to_string(),
            })?;

        let temp_path = options.temp_path(&id);
        let mut file =
            tokio::fs::File::create(&temp_path)
                .await
                .map_err(|e| SyncError::Download {
                    id: id.clone(),
                    reason: format!("cannot create {}: {}", temp_path.display(), e),
                })?;

        let bytes = tokio::io::copy(&mut reader, &mut file)
            .await
            .map_err(|e| SyncError::Download {
                id: id.clone(),
                reason: format!("write to {} failed: {}", temp_path.display(), e),
            })?;
        file.flush().await.map_err(|e| SyncError::Download {
            id: id.clone(),
            reason: e.to_string(),
        })?;

        Ok(bytes)
    };

    let bytes = match options.download_timeout_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), io)
            .await
            .map_err(|_| SyncError::Download {
                id: id.clone(),
                reason: format!("timed out after {}s", secs),
            })??,
        None => io.await?,
    };

    debug!(id = %id, bytes, "resource staged");
    Ok(id)
}
