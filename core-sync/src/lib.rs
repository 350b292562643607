//! # Sync Engine
//!
//! Synchronizes a local directory with the resources of a remote CKAN
//! package.
//!
//! ## Overview
//!
//! A sync run fetches the package manifest, derives a stable canonical ID
//! for every listed resource, filters and deduplicates them into a download
//! set, downloads everything newer than the locally persisted record to
//! temporary files, then commits: temp files are atomically renamed into
//! place, the metadata file is rewritten from the full download set, and
//! (optionally) destination files absent from the set are deleted.
//!
//! ## Components
//!
//! - **Options** (`config`): destination, identity, filter, and cleanup knobs
//! - **Identity Resolver** (`identity`): manifest field → canonical ID
//! - **Diff Engine** (`plan`): manifest → filtered, deduplicated download set
//! - **Metadata Store** (`metadata`): the persisted record of past syncs
//! - **Download Orchestrator** (`download`): timestamp-gated, bounded-concurrency fetches
//! - **Commit & Reconcile** (`commit`): atomic promotion, metadata rewrite, cleanup
//! - **Sync Coordinator** (`coordinator`): drives the stages, one result out
//!
//! ## Guarantees
//!
//! - A file is never observable under its final name in a half-written
//!   state; the only mutation of a live filename is a rename.
//! - Any single download failure fails the whole run before anything is
//!   promoted, leaving destination files and metadata untouched.
//! - Re-running against an unchanged package downloads nothing and leaves
//!   the metadata file byte-identical.

pub mod commit;
pub mod config;
pub mod coordinator;
pub mod download;
pub mod error;
pub mod identity;
pub mod metadata;
pub mod plan;

pub use config::{SyncOptions, DEFAULT_METADATA_FILE, DEFAULT_TEMPORARY_PREFIX};
pub use coordinator::{SyncCoordinator, SyncReport, SyncRunId};
pub use download::DownloadOutcome;
pub use error::{CleanupWarning, Result, SyncError, SyncStage};
pub use metadata::PersistedMetadata;
pub use plan::{DownloadSet, SyncedResource};
