use std::path::PathBuf;
use thiserror::Error;

/// The stage of a sync run that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStage {
    Fetching,
    Resolving,
    Diffing,
    Downloading,
    Committing,
    Reconciling,
}

impl SyncStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStage::Fetching => "fetching",
            SyncStage::Resolving => "resolving",
            SyncStage::Diffing => "diffing",
            SyncStage::Downloading => "downloading",
            SyncStage::Committing => "committing",
            SyncStage::Reconciling => "reconciling",
        }
    }
}

impl std::fmt::Display for SyncStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum SyncError {
    /// Manifest request failed or the API reported failure
    #[error("Failed to fetch package manifest: {0}")]
    Fetch(String),

    /// The manifest is untrustworthy: bad timestamp or missing identity field
    #[error("Malformed manifest: {0}")]
    Manifest(String),

    /// Persisted metadata could not be read or parsed
    #[error("Metadata store error: {0}")]
    Metadata(String),

    /// Destination directory could not be prepared
    #[error("Destination error: {0}")]
    Destination(String),

    /// A single resource fetch or temp-file write failed
    #[error("Download of {id} failed: {reason}")]
    Download { id: String, reason: String },

    /// Promotion or metadata write failed after successful downloads
    #[error("Commit failed: {0}")]
    Commit(String),
}

impl SyncError {
    /// The run stage this error is attributed to
    pub fn stage(&self) -> SyncStage {
        match self {
            SyncError::Fetch(_) => SyncStage::Fetching,
            SyncError::Manifest(_) => SyncStage::Resolving,
            SyncError::Metadata(_) => SyncStage::Diffing,
            SyncError::Destination(_) | SyncError::Download { .. } => SyncStage::Downloading,
            SyncError::Commit(_) => SyncStage::Committing,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

/// A non-fatal failure while deleting an unlisted destination file
///
/// Collected during reconciliation and reported alongside overall success.
#[derive(Debug, Clone)]
pub struct CleanupWarning {
    pub path: PathBuf,
    pub reason: String,
}

impl std::fmt::Display for CleanupWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "could not delete {}: {}", self.path.display(), self.reason)
    }
}
