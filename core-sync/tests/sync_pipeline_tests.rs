//! Integration tests for the full sync pipeline
//!
//! These drive `SyncCoordinator` end to end against a scripted HTTP client
//! and a temp destination directory, covering:
//! - Fresh sync of a whole package
//! - Idempotent re-runs (byte-identical metadata, zero downloads)
//! - The monotonic timestamp gate
//! - Filter exclusivity and cleanup of unlisted files
//! - Atomicity when a single download fails

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bytes::Bytes;
use core_sync::{SyncCoordinator, SyncError, SyncOptions, SyncStage};
use provider_ckan::CkanConnector;
use regex::Regex;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

// ============================================================================
// Scripted HTTP client
// ============================================================================

/// HTTP client that serves a scripted manifest and resource bodies
#[derive(Default)]
struct ScriptedHttpClient {
    manifest: Mutex<String>,
    bodies: Mutex<HashMap<String, Vec<u8>>>,
    failing_urls: Mutex<HashSet<String>>,
}

impl ScriptedHttpClient {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Script the manifest from (url, revision_timestamp) pairs
    fn set_manifest(&self, title: &str, resources: &[(&str, &str)]) {
        let entries: Vec<String> = resources
            .iter()
            .map(|(url, ts)| {
                format!(
                    r#"{{"name": "{url}", "url": "{url}", "revision_timestamp": "{ts}", "format": "CSV"}}"#
                )
            })
            .collect();
        let body = format!(
            r#"{{"success": true, "result": {{"title": "{title}", "resources": [{}]}}}}"#,
            entries.join(",")
        );
        *self.manifest.lock().unwrap() = body;
    }

    fn set_body(&self, url: &str, body: &[u8]) {
        self.bodies
            .lock()
            .unwrap()
            .insert(url.to_string(), body.to_vec());
    }

    fn fail_url(&self, url: &str) {
        self.failing_urls.lock().unwrap().insert(url.to_string());
    }
}

#[async_trait]
impl HttpClient for ScriptedHttpClient {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        assert!(
            request.url.contains("action/package_show"),
            "unexpected buffered request to {}",
            request.url
        );
        Ok(HttpResponse {
            status: 200,
            headers: HashMap::new(),
            body: Bytes::from(self.manifest.lock().unwrap().clone()),
        })
    }

    async fn download_stream(
        &self,
        url: String,
    ) -> BridgeResult<Box<dyn tokio::io::AsyncRead + Send + Unpin>> {
        if self.failing_urls.lock().unwrap().contains(&url) {
            return Err(BridgeError::HttpStatus {
                status: 503,
                message: format!("HTTP 503 from {}", url),
            });
        }
        let body = self
            .bodies
            .lock()
            .unwrap()
            .get(&url)
            .cloned()
            .unwrap_or_else(|| panic!("no scripted body for {}", url));
        Ok(Box::new(std::io::Cursor::new(body)))
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn coordinator(http: Arc<ScriptedHttpClient>, options: SyncOptions) -> SyncCoordinator {
    let connector = CkanConnector::new(http, "http://data.gov.au/api/3");
    SyncCoordinator::new(connector, options)
}

async fn read_file(path: &Path) -> Vec<u8> {
    tokio::fs::read(path).await.unwrap()
}

fn dir_listing(path: &Path) -> BTreeSet<String> {
    std::fs::read_dir(path)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect()
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn fresh_sync_downloads_everything() {
    let dir = tempfile::tempdir().unwrap();
    let http = ScriptedHttpClient::new();
    http.set_manifest(
        "BBQs",
        &[
            ("http://h/a.csv", "2020-01-01T00:00:00"),
            ("http://h/b.csv", "2020-01-02T00:00:00"),
        ],
    );
    http.set_body("http://h/a.csv", b"a-v1");
    http.set_body("http://h/b.csv", b"b-v1");

    let coordinator = coordinator(http, SyncOptions::new(dir.path()));
    let report = coordinator.sync_package("pkg-1").await.unwrap();

    assert_eq!(report.package_title, "BBQs");
    assert_eq!(report.resources_listed, 2);
    assert_eq!(report.downloaded, vec!["a.csv", "b.csv"]);
    assert!(report.kept.is_empty());

    assert_eq!(read_file(&dir.path().join("a.csv")).await, b"a-v1");
    assert_eq!(read_file(&dir.path().join("b.csv")).await, b"b-v1");

    let metadata: serde_json::Value =
        serde_json::from_slice(&read_file(&coordinator.options().metadata_path()).await).unwrap();
    assert_eq!(metadata.as_object().unwrap().len(), 2);
    assert!(metadata["a.csv"]["timestamp"].is_i64());
    assert_eq!(metadata["b.csv"]["resource"]["url"], "http://h/b.csv");
}

#[tokio::test]
async fn second_run_with_no_changes_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let http = ScriptedHttpClient::new();
    http.set_manifest(
        "BBQs",
        &[
            ("http://h/a.csv", "2020-01-01T00:00:00"),
            ("http://h/b.csv", "2020-01-02T00:00:00"),
        ],
    );
    http.set_body("http://h/a.csv", b"a-v1");
    http.set_body("http://h/b.csv", b"b-v1");

    let coordinator = coordinator(http, SyncOptions::new(dir.path()));
    coordinator.sync_package("pkg-1").await.unwrap();
    let metadata_before = read_file(&coordinator.options().metadata_path()).await;

    let report = coordinator.sync_package("pkg-1").await.unwrap();

    assert!(report.downloaded.is_empty());
    assert_eq!(report.kept, vec!["a.csv", "b.csv"]);
    let metadata_after = read_file(&coordinator.options().metadata_path()).await;
    assert_eq!(metadata_before, metadata_after);
}

#[tokio::test]
async fn only_resources_with_advanced_timestamps_redownload() {
    let dir = tempfile::tempdir().unwrap();
    let http = ScriptedHttpClient::new();
    http.set_manifest(
        "BBQs",
        &[
            ("http://h/a.csv", "2020-01-01T00:00:00"),
            ("http://h/b.csv", "2020-01-02T00:00:00"),
        ],
    );
    http.set_body("http://h/a.csv", b"a-v1");
    http.set_body("http://h/b.csv", b"b-v1");

    let coordinator = coordinator(Arc::clone(&http), SyncOptions::new(dir.path()));
    coordinator.sync_package("pkg-1").await.unwrap();

    // b advances; a's served body changes but its timestamp does not,
    // so the stale-served content must never reach the destination
    http.set_manifest(
        "BBQs",
        &[
            ("http://h/a.csv", "2020-01-01T00:00:00"),
            ("http://h/b.csv", "2020-01-03T00:00:00"),
        ],
    );
    http.set_body("http://h/a.csv", b"a-v2-should-not-appear");
    http.set_body("http://h/b.csv", b"b-v2");

    let report = coordinator.sync_package("pkg-1").await.unwrap();

    assert_eq!(report.downloaded, vec!["b.csv"]);
    assert_eq!(report.kept, vec!["a.csv"]);
    assert_eq!(read_file(&dir.path().join("a.csv")).await, b"a-v1");
    assert_eq!(read_file(&dir.path().join("b.csv")).await, b"b-v2");
}

#[tokio::test]
async fn equal_timestamp_is_never_redownloaded() {
    let dir = tempfile::tempdir().unwrap();
    let http = ScriptedHttpClient::new();
    http.set_manifest("BBQs", &[("http://h/a.csv", "2020-01-01T00:00:00")]);
    http.set_body("http://h/a.csv", b"a-v1");

    let coordinator = coordinator(Arc::clone(&http), SyncOptions::new(dir.path()));
    coordinator.sync_package("pkg-1").await.unwrap();

    // same timestamp again; a failing URL proves no fetch is attempted
    http.fail_url("http://h/a.csv");
    let report = coordinator.sync_package("pkg-1").await.unwrap();

    assert!(report.downloaded.is_empty());
    assert_eq!(report.kept, vec!["a.csv"]);
}

#[tokio::test]
async fn duplicate_ids_resolve_to_later_revision() {
    let dir = tempfile::tempdir().unwrap();
    let http = ScriptedHttpClient::new();
    http.set_manifest(
        "Dumps",
        &[
            ("http://h/2019/dump.csv", "2019-06-01T00:00:00"),
            ("http://h/2020/dump.csv", "2020-06-01T00:00:00"),
        ],
    );
    http.set_body("http://h/2020/dump.csv", b"dump-2020");

    let coordinator = coordinator(http, SyncOptions::new(dir.path()));
    let report = coordinator.sync_package("pkg-1").await.unwrap();

    assert_eq!(report.downloaded, vec!["dump.csv"]);
    assert_eq!(read_file(&dir.path().join("dump.csv")).await, b"dump-2020");
}

#[tokio::test]
async fn filtered_resources_are_excluded_and_unprotected() {
    let dir = tempfile::tempdir().unwrap();
    // a leftover kmz from before the filter was configured
    std::fs::write(dir.path().join("c.kmz"), b"old").unwrap();

    let http = ScriptedHttpClient::new();
    http.set_manifest(
        "BBQs",
        &[
            ("http://h/a.csv", "2020-01-01T00:00:00"),
            ("http://h/c.kmz", "2020-01-02T00:00:00"),
        ],
    );
    http.set_body("http://h/a.csv", b"a-v1");

    let options = SyncOptions::new(dir.path())
        .with_id_filter(Regex::new(r"\.csv$").unwrap())
        .with_delete_unlisted(true);
    let coordinator = coordinator(http, options);
    let report = coordinator.sync_package("pkg-1").await.unwrap();

    assert_eq!(report.downloaded, vec!["a.csv"]);
    assert_eq!(report.files_deleted, 1);
    assert!(report.warnings.is_empty());

    let metadata: serde_json::Value =
        serde_json::from_slice(&read_file(&coordinator.options().metadata_path()).await).unwrap();
    assert!(metadata.get("c.kmz").is_none());

    // destination holds exactly the metadata file and the accepted set
    let expected: BTreeSet<String> = [
        "a.csv".to_string(),
        coordinator.options().metadata_file.clone(),
    ]
    .into();
    assert_eq!(dir_listing(dir.path()), expected);
}

#[tokio::test]
async fn failed_download_leaves_destination_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let http = ScriptedHttpClient::new();
    http.set_manifest(
        "BBQs",
        &[
            ("http://h/a.csv", "2020-01-01T00:00:00"),
            ("http://h/b.csv", "2020-01-02T00:00:00"),
        ],
    );
    http.set_body("http://h/a.csv", b"a-v1");
    http.set_body("http://h/b.csv", b"b-v1");

    let coordinator = coordinator(Arc::clone(&http), SyncOptions::new(dir.path()));
    coordinator.sync_package("pkg-1").await.unwrap();
    let metadata_before = read_file(&coordinator.options().metadata_path()).await;

    // both advance, but b's fetch will fail: nothing may be promoted
    http.set_manifest(
        "BBQs",
        &[
            ("http://h/a.csv", "2020-02-01T00:00:00"),
            ("http://h/b.csv", "2020-02-01T00:00:00"),
        ],
    );
    http.set_body("http://h/a.csv", b"a-v2");
    http.fail_url("http://h/b.csv");

    let err = coordinator.sync_package("pkg-1").await.unwrap_err();
    assert!(matches!(&err, SyncError::Download { .. }));
    assert_eq!(err.stage(), SyncStage::Downloading);

    assert_eq!(read_file(&dir.path().join("a.csv")).await, b"a-v1");
    assert_eq!(read_file(&dir.path().join("b.csv")).await, b"b-v1");
    assert_eq!(
        read_file(&coordinator.options().metadata_path()).await,
        metadata_before
    );
}

#[tokio::test]
async fn leftover_temp_files_are_cleaned_on_a_later_run() {
    let dir = tempfile::tempdir().unwrap();
    let http = ScriptedHttpClient::new();
    http.set_manifest("BBQs", &[("http://h/a.csv", "2020-01-01T00:00:00")]);
    http.set_body("http://h/a.csv", b"a-v1");

    let options = SyncOptions::new(dir.path()).with_delete_unlisted(true);
    // simulate a temp file stranded by an aborted earlier run
    std::fs::write(
        dir.path().join(format!("{}b.csv", options.temporary_prefix)),
        b"partial",
    )
    .unwrap();

    let coordinator = coordinator(http, options);
    let report = coordinator.sync_package("pkg-1").await.unwrap();

    assert_eq!(report.files_deleted, 1);
    let expected: BTreeSet<String> = [
        "a.csv".to_string(),
        coordinator.options().metadata_file.clone(),
    ]
    .into();
    assert_eq!(dir_listing(dir.path()), expected);
}

#[tokio::test]
async fn empty_filtered_set_is_a_noop() {
    let dir = tempfile::tempdir().unwrap();
    let http = ScriptedHttpClient::new();
    http.set_manifest("BBQs", &[("http://h/a.csv", "2020-01-01T00:00:00")]);

    let options = SyncOptions::new(dir.path())
        .with_id_filter(Regex::new(r"\.kmz$").unwrap())
        .with_delete_unlisted(true);
    std::fs::write(dir.path().join("stray.txt"), b"s").unwrap();

    let coordinator = coordinator(http, options);
    let report = coordinator.sync_package("pkg-1").await.unwrap();

    // nothing to do: no metadata written, no cleanup pass
    assert!(report.downloaded.is_empty());
    assert!(!coordinator.options().metadata_path().exists());
    assert!(dir.path().join("stray.txt").exists());
}

#[tokio::test]
async fn malformed_timestamp_fails_before_any_download() {
    let dir = tempfile::tempdir().unwrap();
    let http = ScriptedHttpClient::new();
    http.set_manifest(
        "BBQs",
        &[
            ("http://h/a.csv", "2020-01-01T00:00:00"),
            ("http://h/b.csv", "garbage"),
        ],
    );
    http.set_body("http://h/a.csv", b"a-v1");

    let coordinator = coordinator(http, SyncOptions::new(dir.path()));
    let err = coordinator.sync_package("pkg-1").await.unwrap_err();

    assert!(matches!(&err, SyncError::Manifest(_)));
    assert_eq!(err.stage(), SyncStage::Resolving);
    assert!(!dir.path().join("a.csv").exists());
}

#[tokio::test]
async fn custom_canonicaliser_drives_local_names() {
    let dir = tempfile::tempdir().unwrap();
    let http = ScriptedHttpClient::new();
    http.set_manifest("BBQs", &[("http://h/dumps/2020-q3/facilities.csv", "2020-01-01T00:00:00")]);
    http.set_body("http://h/dumps/2020-q3/facilities.csv", b"rows");

    let options = SyncOptions::new(dir.path()).with_canonicaliser(|raw| {
        // keep only the filename, uppercased
        raw.rsplit('/').next().unwrap_or(raw).to_ascii_uppercase()
    });
    let coordinator = coordinator(http, options);
    let report = coordinator.sync_package("pkg-1").await.unwrap();

    assert_eq!(report.downloaded, vec!["FACILITIES.CSV"]);
    assert!(dir.path().join("FACILITIES.CSV").exists());
}
