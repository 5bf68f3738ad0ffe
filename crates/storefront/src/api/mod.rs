//! Clients for the bodega inventory, auth and orders services.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP via `reqwest`; one [`BodegaClient`] serves all
//!   three services from a single base URL
//! - The services are source of truth: the client keeps no state of its own
//! - Each service is a trait ([`InventoryApi`], [`AuthApi`], [`OrdersApi`]) so
//!   the cart and checkout flows can be exercised against an in-process fake
//! - No timeouts and no retries: a failed call is reported once to the caller
//!
//! # Example
//!
//! ```rust,ignore
//! use bodega_storefront::api::{BodegaClient, InventoryApi};
//!
//! let client = BodegaClient::new(&config.api)?;
//! let products = client.list_products().await?;
//! ```

mod client;
mod conversions;
pub mod types;

pub use client::BodegaClient;

use std::future::Future;

use bodega_core::{OrderId, Price, ProductId};
use thiserror::Error;

use crate::models::{OrderDraft, OrderRecord, Product, User};
use crate::session::AuthToken;

/// Errors that can occur when talking to the bodega services.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// The service answered successfully but declined the request
    /// (`success: false` or an `error` body).
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// The response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Message supplied by the service, if it explained the failure.
    ///
    /// Transport and parse failures carry no server message.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected(message) => Some(message),
            Self::Status { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }

    /// Whether the service rejected the caller's credentials.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }
}

/// New stock level to write back for one product after an order.
///
/// The inventory update endpoint replaces the whole record, so name,
/// category and price travel with the new quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockUpdate {
    pub product_id: ProductId,
    pub name: String,
    pub category: String,
    pub quantity: u32,
    pub price: Price,
}

/// Token and identity granted by a successful login or registration.
#[derive(Debug, Clone)]
pub struct AuthGrant {
    pub token: AuthToken,
    pub user: User,
}

/// Login form input.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// Registration form input.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// The inventory service.
pub trait InventoryApi {
    /// Fetch the full product list.
    fn list_products(&self) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send;

    /// Overwrite the stock level of one product.
    fn update_stock(
        &self,
        token: &AuthToken,
        update: &StockUpdate,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// The auth service.
pub trait AuthApi {
    /// Resolve a bearer token to the user it belongs to.
    fn verify(&self, token: &AuthToken) -> impl Future<Output = Result<User, ApiError>> + Send;

    /// Exchange email and password for a token.
    fn login(
        &self,
        credentials: &LoginCredentials,
    ) -> impl Future<Output = Result<AuthGrant, ApiError>> + Send;

    /// Create an account and log into it.
    fn register(
        &self,
        registration: &Registration,
    ) -> impl Future<Output = Result<AuthGrant, ApiError>> + Send;
}

/// The orders service.
pub trait OrdersApi {
    /// Submit an order and return its ID.
    fn place_order(
        &self,
        token: &AuthToken,
        draft: &OrderDraft,
    ) -> impl Future<Output = Result<OrderId, ApiError>> + Send;

    /// List the orders of the token's user.
    fn order_history(
        &self,
        token: &AuthToken,
    ) -> impl Future<Output = Result<Vec<OrderRecord>, ApiError>> + Send;
}

/// Everything the storefront needs from the bodega services.
pub trait StorefrontApi: InventoryApi + AuthApi + OrdersApi {}

impl<T: InventoryApi + AuthApi + OrdersApi> StorefrontApi for T {}
