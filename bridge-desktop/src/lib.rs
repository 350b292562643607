//! # Desktop Bridge Implementations
//!
//! Native implementations of the `bridge-traits` capabilities. Currently a
//! single capability: [`ReqwestHttpClient`], the production HTTP client.

pub mod http;

pub use http::ReqwestHttpClient;
