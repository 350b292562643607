//! Sync the KMZ dumps of a data.gov.au package into `./data`.
//!
//! Run with:
//! `cargo run --example sync_package`

use bridge_desktop::ReqwestHttpClient;
use core_sync::{SyncCoordinator, SyncOptions};
use provider_ckan::CkanConnector;
use regex::Regex;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // BBQs in Townsville
    let package_id = "23218e8f-babe-4e37-81d1-5424a4d1c568";

    let http = Arc::new(ReqwestHttpClient::new());
    let connector = CkanConnector::new(http, "http://data.gov.au/api/3");
    let options = SyncOptions::new("data")
        .with_id_filter(Regex::new(r".*\.kmz$")?)
        .with_delete_unlisted(true);

    let report = SyncCoordinator::new(connector, options)
        .sync_package(package_id)
        .await?;

    println!(
        "synced {:?}: {} downloaded, {} kept, {} deleted",
        report.package_title,
        report.downloaded.len(),
        report.kept.len(),
        report.files_deleted
    );
    for warning in &report.warnings {
        eprintln!("warning: {}", warning);
    }
    Ok(())
}
