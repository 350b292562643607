//! CKAN API connector
//!
//! Fetches package manifests and resource bodies through the `HttpClient`
//! bridge.

use bridge_traits::http::{HttpClient, HttpRequest};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::error::{CkanError, Result};
use crate::types::{Package, PackageShowResponse};

/// CKAN API connector
///
/// # Example
///
/// ```ignore
/// use provider_ckan::CkanConnector;
///
/// let connector = CkanConnector::new(http_client, "http://data.gov.au/api/3");
/// let package = connector.show_package("23218e8f-babe-4e37").await?;
/// ```
pub struct CkanConnector {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    /// API base URL, e.g. `http://data.gov.au/api/3`
    api_base: String,

    /// Optional per-request timeout
    timeout: Option<Duration>,
}

impl CkanConnector {
    /// Create a new connector for the given API base URL
    pub fn new(http_client: Arc<dyn HttpClient>, api_base: impl Into<String>) -> Self {
        Self {
            http_client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            timeout: None,
        }
    }

    /// Set a per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn package_show_url(&self, package_id: &str) -> String {
        format!(
            "{}/action/package_show?id={}",
            self.api_base,
            urlencoding::encode(package_id)
        )
    }

    /// Fetch the manifest for a package
    ///
    /// # Errors
    ///
    /// Returns [`CkanError::ApiError`] on a non-2xx status,
    /// [`CkanError::ApiRejected`] when the envelope reports `success != true`,
    /// and [`CkanError::ParseError`] when the body is not a valid
    /// `package_show` reply.
    #[instrument(skip(self), fields(package_id = %package_id))]
    pub async fn show_package(&self, package_id: &str) -> Result<Package> {
        let url = self.package_show_url(package_id);
        info!(url = %url, "Fetching package manifest");

        let mut request = HttpRequest::get(url).header("Accept", "application/json");
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = self.http_client.execute(request).await?;
        if !response.is_success() {
            return Err(CkanError::ApiError {
                status_code: response.status,
                message: String::from_utf8_lossy(&response.body).to_string(),
            });
        }

        let reply: PackageShowResponse = serde_json::from_slice(&response.body)
            .map_err(|e| CkanError::ParseError(format!("bad package_show reply: {}", e)))?;

        if !reply.success {
            return Err(CkanError::ApiRejected {
                success: reply.success.to_string(),
            });
        }

        let package = reply
            .result
            .ok_or_else(|| CkanError::ParseError("reply has no result object".to_string()))?;

        debug!(
            title = %package.title,
            resources = package.resources.len(),
            "Manifest fetched"
        );
        Ok(package)
    }

    /// Open a streaming download of a resource body
    pub async fn download_resource(
        &self,
        url: &str,
    ) -> Result<Box<dyn tokio::io::AsyncRead + Send + Unpin>> {
        debug!(url = %url, "Opening resource download stream");
        Ok(self.http_client.download_stream(url.to_string()).await?)
    }
}
