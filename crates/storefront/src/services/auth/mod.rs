//! Authentication service.
//!
//! Drives the [`Session`] through its states against the auth service:
//! startup token verification, email/password login, registration and
//! logout. Form input is validated before any network call.

mod error;

pub use error::AuthError;

use bodega_core::Email;
use tracing::instrument;

use crate::api::{AuthApi, AuthGrant, LoginCredentials, Registration};
use crate::models::User;
use crate::session::Session;
use crate::store::KeyValueStore;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Outcome of verifying the persisted token at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenCheck {
    /// No token was stored; the session stays anonymous.
    NoToken,
    /// The token is valid; the session is authenticated as this user.
    Verified(User),
    /// The token was refused or could not be checked; it has been discarded.
    Rejected,
}

/// Authentication service.
///
/// Borrows the auth client and the key-value store that holds the token.
pub struct AuthService<'a, A, S> {
    api: &'a A,
    store: &'a S,
}

impl<'a, A: AuthApi, S: KeyValueStore> AuthService<'a, A, S> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(api: &'a A, store: &'a S) -> Self {
        Self { api, store }
    }

    /// Restore the session from the persisted token, if there is one.
    ///
    /// Any failure, including a network error, discards the token.
    #[instrument(skip_all)]
    pub async fn check_existing_token(&self, session: &mut Session) -> TokenCheck {
        let Some(token) = Session::stored_token(self.store) else {
            return TokenCheck::NoToken;
        };

        session.begin();
        match self.api.verify(&token).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "stored token verified");
                self.establish(session, AuthGrant { token, user: user.clone() });
                TokenCheck::Verified(user)
            }
            Err(e) => {
                tracing::info!(error = %e, "stored token refused; discarding");
                session.invalidate(self.store);
                TokenCheck::Rejected
            }
        }
    }

    // =========================================================================
    // Password Authentication
    // =========================================================================

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::EmptyField` or `AuthError::InvalidEmail` without
    /// contacting the service if the form is incomplete.
    /// Returns `AuthError::Rejected` with the service's message if the
    /// credentials are refused. A session that was already logged in stays
    /// logged in as before.
    #[instrument(skip(self, session, password))]
    pub async fn login(
        &self,
        session: &mut Session,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let email = validate_email(email)?;
        require("password", password)?;

        let credentials = LoginCredentials {
            email: email.into_inner(),
            password: password.to_string(),
        };

        session.begin();
        match self.api.login(&credentials).await {
            Ok(grant) => Ok(self.establish(session, grant)),
            Err(e) => {
                session.fail();
                Err(AuthError::from_service(e))
            }
        }
    }

    /// Create an account and log into it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::EmptyField`, `AuthError::InvalidEmail` or
    /// `AuthError::WeakPassword` without contacting the service if the form
    /// is invalid.
    /// Returns `AuthError::Rejected` with the service's message if the
    /// registration is refused.
    #[instrument(skip(self, session, name, password))]
    pub async fn register(
        &self,
        session: &mut Session,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        require("name", name)?;
        let email = validate_email(email)?;
        validate_password(password)?;

        let registration = Registration {
            name: name.trim().to_string(),
            email: email.into_inner(),
            password: password.to_string(),
        };

        session.begin();
        match self.api.register(&registration).await {
            Ok(grant) => Ok(self.establish(session, grant)),
            Err(e) => {
                session.fail();
                Err(AuthError::from_service(e))
            }
        }
    }

    /// Forget the user and token, locally and in the store.
    pub fn logout(&self, session: &mut Session) {
        if let Err(e) = session.clear(self.store) {
            tracing::warn!(error = %e, "could not remove stored token");
        }
    }

    fn establish(&self, session: &mut Session, grant: AuthGrant) -> User {
        let user = grant.user.clone();
        if let Err(e) = session.establish(self.store, grant.user, grant.token) {
            tracing::warn!(error = %e, "could not persist token; session will not survive restart");
        }
        user
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn require(field: &'static str, value: &str) -> Result<(), AuthError> {
    if value.trim().is_empty() {
        return Err(AuthError::EmptyField(field));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<Email, AuthError> {
    require("email", email)?;
    Ok(Email::parse(email)?)
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    require("password", password)?;
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}
