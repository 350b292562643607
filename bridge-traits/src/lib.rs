//! # Host Bridge Traits
//!
//! Capability traits the sync engine depends on but does not implement.
//!
//! ## Overview
//!
//! The engine never talks to the network directly; it consumes an
//! [`HttpClient`](http::HttpClient) capability that a host crate provides
//! (see `bridge-desktop` for the reqwest-backed implementation). Keeping the
//! seam here lets tests script remote behavior without a server.

pub mod error;
pub mod http;

pub use error::{BridgeError, Result};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
