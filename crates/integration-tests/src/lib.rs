//! Integration tests for the bodega storefront.
//!
//! # Running Tests
//!
//! ```bash
//! # Point at a running bodega API
//! export BODEGA_API_URL=http://localhost:3000/api
//!
//! # Run the ignored live tests
//! cargo test -p bodega-integration-tests -- --ignored
//! ```
//!
//! The tests register throwaway accounts and place real orders, which
//! decrements live stock. Never point them at production.

use std::time::{SystemTime, UNIX_EPOCH};

use bodega_storefront::api::BodegaClient;
use bodega_storefront::config::ApiConfig;
use url::Url;

/// Base URL for the bodega API (configurable via environment).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("BODEGA_API_URL").unwrap_or_else(|_| "http://localhost:3000/api".to_string())
}

/// Client for the live API.
///
/// # Panics
///
/// Panics if `BODEGA_API_URL` is not a valid URL.
#[must_use]
#[allow(clippy::expect_used)]
pub fn client() -> BodegaClient {
    let base_url = Url::parse(&api_base_url()).expect("BODEGA_API_URL must be a valid URL");
    BodegaClient::new(&ApiConfig { base_url }).expect("Failed to create HTTP client")
}

/// An email address no earlier run has registered.
#[must_use]
pub fn unique_email() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos());
    format!("it-{nanos}@bodega.test")
}
