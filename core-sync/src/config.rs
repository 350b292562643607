//! Sync run configuration
//!
//! [`SyncOptions`] carries everything a run needs to know about identity,
//! filtering, the destination directory, and cleanup policy. Defaults match
//! the common case: resources identified by the last path segment of their
//! download URL, no filter, no deletion of unlisted files.

use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default filename for the persisted sync metadata, inside the destination
pub const DEFAULT_METADATA_FILE: &str = ".sync-metadata.json";

/// Default prefix for in-flight download files, inside the destination
pub const DEFAULT_TEMPORARY_PREFIX: &str = ".inflight-";

/// Maps a raw identity field value to a canonical resource ID
pub type Canonicaliser = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Configuration for a sync run
#[derive(Clone)]
pub struct SyncOptions {
    /// Manifest field used as the raw resource identity (default `"url"`)
    pub id_field_name: String,

    /// Canonicalization of the raw identity; `None` means last `/`-segment.
    /// Useful for portals that publish revised dumps under fresh URLs that
    /// still share a trailing filename.
    pub id_canonicaliser: Option<Canonicaliser>,

    /// Only canonical IDs matching this pattern are synced (default: all)
    pub id_filter: Option<Regex>,

    /// Directory the downloads land in (required)
    pub data_destination: PathBuf,

    /// Delete destination files that are not in the filtered remote set
    pub delete_unlisted: bool,

    /// Filename of the persisted metadata record
    pub metadata_file: String,

    /// Prefix for temp files holding in-flight downloads
    pub temporary_prefix: String,

    /// Worker-pool width for resource downloads
    pub max_concurrent_downloads: usize,

    /// Wall-clock limit per resource download, in seconds
    pub download_timeout_secs: Option<u64>,
}

impl SyncOptions {
    /// Options with defaults for the given destination directory
    pub fn new(data_destination: impl Into<PathBuf>) -> Self {
        Self {
            id_field_name: "url".to_string(),
            id_canonicaliser: None,
            id_filter: None,
            data_destination: data_destination.into(),
            delete_unlisted: false,
            metadata_file: DEFAULT_METADATA_FILE.to_string(),
            temporary_prefix: DEFAULT_TEMPORARY_PREFIX.to_string(),
            max_concurrent_downloads: 4,
            download_timeout_secs: None,
        }
    }

    pub fn with_id_field_name(mut self, field: impl Into<String>) -> Self {
        self.id_field_name = field.into();
        self
    }

    pub fn with_canonicaliser(
        mut self,
        canonicaliser: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.id_canonicaliser = Some(Arc::new(canonicaliser));
        self
    }

    pub fn with_id_filter(mut self, filter: Regex) -> Self {
        self.id_filter = Some(filter);
        self
    }

    pub fn with_delete_unlisted(mut self, delete: bool) -> Self {
        self.delete_unlisted = delete;
        self
    }

    pub fn with_metadata_file(mut self, name: impl Into<String>) -> Self {
        self.metadata_file = name.into();
        self
    }

    pub fn with_temporary_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.temporary_prefix = prefix.into();
        self
    }

    pub fn with_max_concurrent_downloads(mut self, width: usize) -> Self {
        self.max_concurrent_downloads = width;
        self
    }

    pub fn with_download_timeout_secs(mut self, secs: u64) -> Self {
        self.download_timeout_secs = Some(secs);
        self
    }

    /// Path of the persisted metadata file
    pub fn metadata_path(&self) -> PathBuf {
        self.data_destination.join(&self.metadata_file)
    }

    /// Temp path an in-flight download for `id` is written to
    pub fn temp_path(&self, id: &str) -> PathBuf {
        self.data_destination
            .join(format!("{}{}", self.temporary_prefix, id))
    }

    /// Final path a committed resource lives at
    pub fn final_path(&self, id: &str) -> PathBuf {
        self.data_destination.join(id)
    }

    pub fn destination(&self) -> &Path {
        &self.data_destination
    }
}

impl fmt::Debug for SyncOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncOptions")
            .field("id_field_name", &self.id_field_name)
            .field(
                "id_canonicaliser",
                &self.id_canonicaliser.as_ref().map(|_| "<fn>"),
            )
            .field("id_filter", &self.id_filter.as_ref().map(|r| r.as_str()))
            .field("data_destination", &self.data_destination)
            .field("delete_unlisted", &self.delete_unlisted)
            .field("metadata_file", &self.metadata_file)
            .field("temporary_prefix", &self.temporary_prefix)
            .field("max_concurrent_downloads", &self.max_concurrent_downloads)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .finish()
    }
}
