//! Identity Resolver
//!
//! Derives the stable canonical ID a resource is known by across runs. The
//! ID doubles as the local filename, so it must be non-empty and is expected
//! to be unique within a manifest (duplicates are resolved by the diff
//! engine, not here).

use provider_ckan::PackageResource;

use crate::config::SyncOptions;
use crate::error::{Result, SyncError};

/// Default canonicalization: the final `/`-separated segment
///
/// Assumes the identity field is a URL-like string; for
/// `http://host/data/bbqs.csv` this yields `bbqs.csv`.
pub fn last_path_segment(raw: &str) -> String {
    raw.rsplit('/').next().unwrap_or(raw).to_string()
}

/// Resolve the canonical ID for a manifest resource
///
/// Reads the configured identity field and applies the configured
/// canonicaliser (default: [`last_path_segment`]).
///
/// # Errors
///
/// Returns [`SyncError::Manifest`] when the identity field is absent or the
/// canonical ID comes out empty.
pub fn resolve_id(resource: &PackageResource, options: &SyncOptions) -> Result<String> {
    let raw = resource.field(&options.id_field_name).ok_or_else(|| {
        SyncError::Manifest(format!(
            "resource {:?} has no {:?} field",
            resource.name, options.id_field_name
        ))
    })?;

    let id = match &options.id_canonicaliser {
        Some(canonicalise) => canonicalise(raw),
        None => last_path_segment(raw),
    };

    if id.is_empty() {
        return Err(SyncError::Manifest(format!(
            "resource {:?} canonicalizes to an empty ID (from {:?})",
            resource.name, raw
        )));
    }
    Ok(id)
}
