//! Sync Coordinator
//!
//! Drives a single run through its stages:
//!
//! ```text
//! Fetching → Resolving/Filtering → Diffing → Downloading
//!     → Committing → (Reconciling) → Done
//! ```
//!
//! with a terminal `Failed` reachable from fetching, resolving, or
//! downloading. No stage is re-entered. Exactly one result surfaces to the
//! caller: a [`SyncReport`] (possibly carrying non-fatal cleanup warnings)
//! or the first error encountered, annotated with its stage via
//! [`SyncError::stage`](crate::error::SyncError::stage).
//!
//! Callers must serialize runs against the same destination themselves; the
//! coordinator assumes nothing else mutates the destination during a run.

use provider_ckan::CkanConnector;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::commit;
use crate::config::SyncOptions;
use crate::download;
use crate::error::{CleanupWarning, Result, SyncError};
use crate::metadata;
use crate::plan;

/// Unique identifier for one sync run, carried in the run's tracing span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SyncRunId(Uuid);

impl SyncRunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SyncRunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SyncRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a successful run did
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// Run identifier
    pub run_id: SyncRunId,

    /// Title of the synced package
    pub package_title: String,

    /// Resources the manifest listed before filtering
    pub resources_listed: usize,

    /// Canonical IDs downloaded this run
    pub downloaded: Vec<String>,

    /// Canonical IDs whose local copy was already current
    pub kept: Vec<String>,

    /// Unlisted destination files deleted during reconciliation
    pub files_deleted: usize,

    /// Non-fatal cleanup failures
    pub warnings: Vec<CleanupWarning>,
}

/// Orchestrates sync runs for one destination
pub struct SyncCoordinator {
    connector: CkanConnector,
    options: SyncOptions,
}

impl SyncCoordinator {
    pub fn new(connector: CkanConnector, options: SyncOptions) -> Self {
        Self { connector, options }
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Synchronize the destination directory with a package's resources
    ///
    /// # Errors
    ///
    /// Returns the first error any stage produced. A failed run leaves
    /// destination files and the metadata record exactly as they were;
    /// staged temp files may remain and are safely ignorable.
    #[instrument(skip(self), fields(package_id = %package_id, run_id = tracing::field::Empty))]
    pub async fn sync_package(&self, package_id: &str) -> Result<SyncReport> {
        let run_id = SyncRunId::new();
        tracing::Span::current().record("run_id", tracing::field::display(&run_id));

        // Fetching
        let package = self
            .connector
            .show_package(package_id)
            .await
            .map_err(|e| SyncError::Fetch(e.to_string()))?;
        info!(
            title = %package.title,
            resources = package.resources.len(),
            "package manifest fetched"
        );

        // Resolving / Filtering / Diffing
        let set = plan::build_download_set(&package.resources, &self.options)?;
        if set.is_empty() {
            info!("no files to download, nothing to do");
            return Ok(SyncReport {
                run_id,
                package_title: package.title,
                resources_listed: package.resources.len(),
                downloaded: Vec::new(),
                kept: Vec::new(),
                files_deleted: 0,
                warnings: Vec::new(),
            });
        }

        let prior = metadata::read(&self.options.metadata_path()).await?;

        // Downloading
        tokio::fs::create_dir_all(self.options.destination())
            .await
            .map_err(|e| {
                SyncError::Destination(format!(
                    "cannot create {}: {}",
                    self.options.destination().display(),
                    e
                ))
            })?;
        let outcome = download::run(&set, &prior, &self.connector, &self.options).await?;
        info!(
            downloaded = outcome.downloaded.len(),
            kept = outcome.kept.len(),
            "downloads complete"
        );

        // Committing
        commit::commit(&outcome.downloaded, &set, &self.options).await?;

        // Reconciling
        let (files_deleted, warnings) = if self.options.delete_unlisted {
            commit::reconcile(&set, &self.options).await
        } else {
            (0, Vec::new())
        };

        info!(
            downloaded = outcome.downloaded.len(),
            kept = outcome.kept.len(),
            files_deleted,
            warnings = warnings.len(),
            "sync run complete"
        );
        Ok(SyncReport {
            run_id,
            package_title: package.title,
            resources_listed: package.resources.len(),
            downloaded: outcome.downloaded,
            kept: outcome.kept,
            files_deleted,
            warnings,
        })
    }
}
