//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `BODEGA_API_URL` - Base URL of the inventory, auth and orders services
//!   (default: `http://localhost:3000/api`)
//! - `BODEGA_DATA_DIR` - Directory holding the persisted cart and token
//!   (default: `.bodega`)
//! - `BODEGA_DELIVERY_ADDRESS` - Delivery address placed on every order
//!   (default: `Retiro en tienda`)
//! - `BODEGA_PAYMENT_METHOD` - Payment method placed on every order
//!   (default: `efectivo`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:3000/api";
const DEFAULT_DATA_DIR: &str = ".bodega";
const DEFAULT_DELIVERY_ADDRESS: &str = "Retiro en tienda";
const DEFAULT_PAYMENT_METHOD: &str = "efectivo";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Bodega services configuration
    pub api: ApiConfig,
    /// Directory of the file-backed key-value store
    pub data_dir: PathBuf,
    /// Fixed values placed on every order
    pub checkout: CheckoutDefaults,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Bodega services configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL; endpoint paths are resolved beneath it.
    pub base_url: Url,
}

/// Delivery and payment values sent with every order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutDefaults {
    pub delivery_address: String,
    pub payment_method: String,
}

impl Default for CheckoutDefaults {
    fn default() -> Self {
        Self {
            delivery_address: DEFAULT_DELIVERY_ADDRESS.to_string(),
            payment_method: DEFAULT_PAYMENT_METHOD.to_string(),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let base_url = parse_api_url(&get_or("BODEGA_API_URL", DEFAULT_API_URL))?;

        Ok(Self {
            api: ApiConfig { base_url },
            data_dir: PathBuf::from(get_or("BODEGA_DATA_DIR", DEFAULT_DATA_DIR)),
            checkout: CheckoutDefaults {
                delivery_address: get_or("BODEGA_DELIVERY_ADDRESS", DEFAULT_DELIVERY_ADDRESS),
                payment_method: get_or("BODEGA_PAYMENT_METHOD", DEFAULT_PAYMENT_METHOD),
            },
            sentry_dsn: get("SENTRY_DSN"),
            sentry_environment: get("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse the services base URL, accepting only absolute http(s) URLs.
fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar("BODEGA_API_URL".to_string(), reason);

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        "http" | "https" => Err(invalid("URL must have a host".to_string())),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.api.base_url.as_str(), "http://localhost:3000/api");
        assert_eq!(config.data_dir, PathBuf::from(".bodega"));
        assert_eq!(config.checkout, CheckoutDefaults::default());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("BODEGA_API_URL", "https://api.bodega.test/v1"),
            ("BODEGA_DATA_DIR", "/tmp/bodega"),
            ("BODEGA_PAYMENT_METHOD", "tarjeta"),
            ("SENTRY_DSN", "https://key@sentry.test/1"),
        ])
        .unwrap();

        assert_eq!(config.api.base_url.host_str(), Some("api.bodega.test"));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/bodega"));
        assert_eq!(config.checkout.payment_method, "tarjeta");
        assert_eq!(config.checkout.delivery_address, "Retiro en tienda");
        assert!(config.sentry_dsn.is_some());
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = load(&[("BODEGA_DATA_DIR", "   ")]).unwrap();
        assert_eq!(config.data_dir, PathBuf::from(".bodega"));
    }

    #[test]
    fn test_rejects_non_http_url() {
        let err = load(&[("BODEGA_API_URL", "ftp://bodega.test")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "BODEGA_API_URL"));
    }

    #[test]
    fn test_rejects_unparseable_url() {
        assert!(load(&[("BODEGA_API_URL", "not a url")]).is_err());
    }
}
