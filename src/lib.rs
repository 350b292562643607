//! # ckansync
//!
//! Facade crate for the ckansync workspace: synchronize a local directory
//! with the resources of a CKAN package (data.gov.au style portals).
//!
//! Re-exports the member crates and provides a default logging setup. For
//! the engine itself see [`core_sync`]; for the portal connector see
//! [`provider_ckan`].
//!
//! ## Quick start
//!
//! ```ignore
//! use ckansync::{CkanConnector, ReqwestHttpClient, SyncCoordinator, SyncOptions};
//! use std::sync::Arc;
//!
//! ckansync::init_logging();
//!
//! let http = Arc::new(ReqwestHttpClient::new());
//! let connector = CkanConnector::new(http, "http://data.gov.au/api/3");
//! let coordinator = SyncCoordinator::new(connector, SyncOptions::new("data"));
//! let report = coordinator.sync_package("5bd7fcab-e315-42cb-8daf-50b7efc2027e").await?;
//! ```

pub use bridge_desktop::ReqwestHttpClient;
pub use bridge_traits::{HttpClient, HttpRequest, HttpResponse, RetryPolicy};
pub use core_sync::{
    CleanupWarning, SyncCoordinator, SyncError, SyncOptions, SyncReport, SyncRunId, SyncStage,
};
pub use provider_ckan::{CkanConnector, CkanError, Package, PackageResource};

/// Initialize tracing with an env-filter (`RUST_LOG`) and a sane default
///
/// Safe to call once at startup; embedding applications that install their
/// own subscriber should skip this.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
