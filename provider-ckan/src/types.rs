//! CKAN API response types
//!
//! Data structures for deserializing `action/package_show` responses.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CkanError, Result};

/// Accepted layouts of `revision_timestamp`: ISO 8601 date-time with an
/// optional fractional-second part and no timezone designator.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// One downloadable resource in a package manifest
///
/// Only the fields the sync engine interprets are modeled; everything else
/// the portal reports is kept in `extra` so the entry can be persisted and
/// round-tripped unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackageResource {
    /// Human-readable resource name
    pub name: String,

    /// Download URL
    pub url: String,

    /// Revision timestamp as reported by the portal (see [`Self::revision_instant`])
    pub revision_timestamp: String,

    /// Unmodeled manifest fields, preserved verbatim
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl PackageResource {
    /// Read a manifest field by name, as configured via `id_field_name`
    ///
    /// Returns `None` if the field is absent or not a string.
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "name" => Some(&self.name),
            "url" => Some(&self.url),
            "revision_timestamp" => Some(&self.revision_timestamp),
            other => self.extra.get(other).and_then(Value::as_str),
        }
    }

    /// Parse the revision timestamp.
    ///
    /// Contract of the manifest format: CKAN reports timezone-naive
    /// timestamps (e.g. `2013-05-13T04:13:38.459647`) that are in fact UTC.
    /// They are parsed as naive date-times and interpreted as UTC; a string
    /// carrying an explicit offset is malformed.
    pub fn revision_instant(&self) -> Result<DateTime<Utc>> {
        NaiveDateTime::parse_from_str(&self.revision_timestamp, TIMESTAMP_FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(|e| CkanError::InvalidTimestamp {
                value: self.revision_timestamp.clone(),
                reason: e.to_string(),
            })
    }

    /// The revision timestamp as Unix epoch milliseconds
    pub fn revision_epoch_millis(&self) -> Result<i64> {
        Ok(self.revision_instant()?.timestamp_millis())
    }
}

/// The `result` object of a `package_show` reply
#[derive(Debug, Clone, Deserialize)]
pub struct Package {
    /// Package title
    pub title: String,

    /// Resources listed for this package
    #[serde(default)]
    pub resources: Vec<PackageResource>,
}

/// Top-level `package_show` reply envelope
#[derive(Debug, Deserialize)]
pub struct PackageShowResponse {
    /// Whether the API call succeeded
    pub success: bool,

    /// Package payload (present when `success` is true)
    pub result: Option<Package>,
}
