//! Diff Engine
//!
//! Turns the raw manifest resource list into the run's download set:
//! canonical IDs resolved, the filter applied, duplicates collapsed. The set
//! intentionally contains every filtered resource, not just the changed ones
//! — the comparison against persisted metadata happens at download time, so
//! the record written at commit always reflects the full filtered manifest.

use provider_ckan::PackageResource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::config::SyncOptions;
use crate::error::{Result, SyncError};
use crate::identity;

/// A resource slated for synchronization, as persisted in the metadata file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncedResource {
    /// Revision timestamp, Unix epoch milliseconds
    pub timestamp: i64,

    /// The original manifest entry
    pub resource: PackageResource,
}

/// The working set of a run: canonical ID → resource to consider
///
/// Ordered so metadata serialization is deterministic; two runs over the
/// same manifest persist byte-identical records.
pub type DownloadSet = BTreeMap<String, SyncedResource>;

/// Build the download set from a manifest's resource list
///
/// Processes resources in manifest order: resolve the canonical ID, parse
/// the revision timestamp, apply the filter, and collapse duplicate IDs by
/// keeping the later revision (a strictly older duplicate is discarded with
/// a warning).
///
/// # Errors
///
/// A missing identity field or an unparseable timestamp is a
/// [`SyncError::Manifest`] error for the whole run; a manifest that cannot
/// be interpreted consistently is not processed partially.
pub fn build_download_set(
    resources: &[PackageResource],
    options: &SyncOptions,
) -> Result<DownloadSet> {
    let mut set = DownloadSet::new();

    for resource in resources {
        let id = identity::resolve_id(resource, options)?;
        let timestamp = resource
            .revision_epoch_millis()
            .map_err(|e| SyncError::Manifest(e.to_string()))?;

        if let Some(filter) = &options.id_filter {
            if !filter.is_match(&id) {
                debug!(%id, "rejected by ID filter");
                continue;
            }
            debug!(%id, "accepted by ID filter");
        }

        if let Some(prior) = set.get(&id) {
            warn!(%id, "duplicate manifest entry for canonical ID");
            if prior.timestamp > timestamp {
                warn!(%id, "discarding the older duplicate");
                continue;
            }
        }

        set.insert(
            id,
            SyncedResource {
                timestamp,
                resource: resource.clone(),
            },
        );
    }

    Ok(set)
}
