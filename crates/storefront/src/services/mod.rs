//! Flows that coordinate local state with the bodega services.
//!
//! # Services
//!
//! - `auth` - Token verification, login, registration and logout
//! - `checkout` - Order submission and stock reconciliation

pub mod auth;
pub mod checkout;

pub use auth::{AuthError, AuthService, MIN_PASSWORD_LENGTH, TokenCheck};
pub use checkout::{CheckoutError, CheckoutService, StockSyncReport, StockUpdateFailure};
