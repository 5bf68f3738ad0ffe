//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type returned by every `AppState` command.
//! Each error knows its class and turns itself into a [`Notice`] for the
//! user; network-class errors are captured to Sentry before that happens.

use thiserror::Error;

use crate::api::ApiError;
use crate::cart::CartError;
use crate::models::User;
use crate::notice::Notice;
use crate::services::{AuthError, CheckoutError};
use crate::store::StoreError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// A cart mutation was refused.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Login, registration or token verification failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Checkout failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// A bodega service call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Local persistence failed.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// The command needs a logged-in user.
    #[error("Not logged in")]
    NotLoggedIn,
}

/// Where an error comes from, which decides how it is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Refused input or unmet precondition; nothing was sent, or the
    /// service refused and said why.
    Validation,
    /// Transport failure or unexpected service answer.
    Network,
    /// The local key-value store failed.
    Persistence,
}

impl AppError {
    /// Classify the error.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Cart(_) | Self::NotLoggedIn => ErrorClass::Validation,
            Self::Auth(AuthError::Api(_)) => ErrorClass::Network,
            Self::Auth(_) => ErrorClass::Validation,
            Self::Checkout(CheckoutError::Rejected(_) | CheckoutError::StockSync { .. })
            | Self::Api(_) => ErrorClass::Network,
            Self::Checkout(_) => ErrorClass::Validation,
            Self::Store(_) => ErrorClass::Persistence,
        }
    }

    /// User-facing notice for this error.
    ///
    /// Network details are never shown; they are logged by [`report`](Self::report).
    #[must_use]
    pub fn notice(&self) -> Notice {
        let message = match self {
            Self::Cart(err) => err.to_string(),
            Self::Auth(AuthError::Api(_)) => {
                "Could not reach the login service, please try again".to_string()
            }
            Self::Auth(AuthError::InvalidEmail(_)) => "Invalid email address".to_string(),
            Self::Auth(err) => capitalize(&err.to_string()),
            Self::Checkout(CheckoutError::NotLoggedIn) | Self::NotLoggedIn => {
                "Please log in to continue".to_string()
            }
            Self::Checkout(CheckoutError::StockSync { order_id, .. }) => format!(
                "Order {order_id} was placed, but stock could not be updated. Please contact the store"
            ),
            Self::Checkout(CheckoutError::Rejected(_)) => {
                "Your order could not be placed, please try again".to_string()
            }
            Self::Checkout(err) => capitalize(&err.to_string()),
            Self::Api(_) => "Could not reach the store, please try again".to_string(),
            Self::Store(_) => "Could not save your data locally".to_string(),
        };
        Notice::error(message)
    }

    /// Log the error, capturing network-class errors to Sentry.
    pub fn report(&self) {
        match self.class() {
            ErrorClass::Network => {
                let event_id = sentry::capture_error(self);
                tracing::error!(
                    error = %self,
                    sentry_event_id = %event_id,
                    "Command error"
                );
            }
            ErrorClass::Persistence => tracing::warn!(error = %self, "Storage error"),
            ErrorClass::Validation => tracing::debug!(error = %self, "Command refused"),
        }
    }

    /// Report the error and return its notice.
    #[must_use]
    pub fn into_notice(self) -> Notice {
        self.report();
        self.notice()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user: &User) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user.id.to_string()),
            email: Some(user.email.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "12")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
