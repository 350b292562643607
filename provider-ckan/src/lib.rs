//! # CKAN Portal Provider
//!
//! Connector for CKAN-style open data portals (data.gov.au and friends).
//!
//! ## Overview
//!
//! CKAN exposes package metadata through `action/package_show`, which
//! returns the package title plus the list of downloadable resources with
//! their revision timestamps. This crate handles:
//! - Fetching and validating the `package_show` manifest
//! - Deserializing manifest entries while preserving unmodeled fields
//! - Parsing CKAN's timezone-naive revision timestamps (treated as UTC)
//! - Streaming resource downloads via the `HttpClient` bridge

pub mod connector;
pub mod error;
pub mod types;

pub use connector::CkanConnector;
pub use error::{CkanError, Result};
pub use types::{Package, PackageResource, PackageShowResponse};
