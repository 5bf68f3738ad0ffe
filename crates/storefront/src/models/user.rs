//! User identity as returned by the auth service.

use bodega_core::{Email, UserId};
use serde::{Deserialize, Serialize};

/// The authenticated customer.
///
/// Never persisted locally: only the bearer token survives a restart and the
/// user is re-derived by verifying that token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
}
