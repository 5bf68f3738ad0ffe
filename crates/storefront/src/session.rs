//! Session state: who is logged in, and with which bearer token.
//!
//! The user and the token are stored together, so one can never be present
//! without the other. Only the token is persisted; the user is re-derived by
//! verifying the token against the auth service at startup.

use secrecy::{ExposeSecret, SecretString};

use crate::models::User;
use crate::store::{KeyValueStore, StoreError, keys};

/// Opaque bearer token issued by the auth service.
///
/// The `Debug` output never includes the token itself.
#[derive(Clone)]
pub struct AuthToken(SecretString);

impl AuthToken {
    /// Wrap a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// The raw token, for use in an `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken([REDACTED])")
    }
}

/// Lifecycle of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nobody is logged in.
    #[default]
    Anonymous,
    /// A login, registration or token check is waiting on the auth service.
    Authenticating,
    /// A verified user and token are held.
    Authenticated,
    /// A stored token was refused; it is being discarded.
    Invalid,
}

/// The logged-in user and their token.
#[derive(Debug, Clone)]
struct Credentials {
    user: User,
    token: AuthToken,
}

/// Current authentication state of the storefront.
#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
    credentials: Option<Credentials>,
}

impl Session {
    /// A fresh anonymous session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated)
    }

    /// The logged-in user.
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.credentials.as_ref().map(|c| &c.user)
    }

    /// The bearer token of the logged-in user.
    #[must_use]
    pub fn token(&self) -> Option<&AuthToken> {
        self.credentials.as_ref().map(|c| &c.token)
    }

    /// User and token together, only while `Authenticated`.
    #[must_use]
    pub fn authenticated(&self) -> Option<(&User, &AuthToken)> {
        if !self.is_authenticated() {
            return None;
        }
        self.credentials.as_ref().map(|c| (&c.user, &c.token))
    }

    /// Read the persisted token, if any.
    ///
    /// An unreadable store is treated the same as an absent token.
    pub fn stored_token<S: KeyValueStore>(store: &S) -> Option<AuthToken> {
        match store.get(keys::TOKEN) {
            Ok(Some(raw)) if !raw.trim().is_empty() => Some(AuthToken::new(raw.trim())),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored token");
                None
            }
        }
    }

    /// Enter `Authenticating` while a request to the auth service is pending.
    pub(crate) fn begin(&mut self) {
        self.transition(SessionState::Authenticating);
    }

    /// Enter `Authenticated` with `user` and `token`.
    ///
    /// The session is authenticated even when persisting the token fails;
    /// the error is returned so the caller can log it.
    pub(crate) fn establish<S: KeyValueStore>(
        &mut self,
        store: &S,
        user: User,
        token: AuthToken,
    ) -> Result<(), StoreError> {
        let persisted = store.set(keys::TOKEN, token.expose());
        self.credentials = Some(Credentials { user, token });
        self.transition(SessionState::Authenticated);
        persisted
    }

    /// Settle after a failed login or registration.
    ///
    /// Credentials held before the attempt, and their stored token, are
    /// kept; otherwise the session returns to `Anonymous`.
    pub(crate) fn fail(&mut self) {
        let to = if self.credentials.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        };
        self.transition(to);
    }

    /// Discard a token the auth service refused, then settle at `Anonymous`.
    pub(crate) fn invalidate<S: KeyValueStore>(&mut self, store: &S) {
        self.transition(SessionState::Invalid);
        self.credentials = None;
        if let Err(e) = store.remove(keys::TOKEN) {
            tracing::warn!(error = %e, "could not discard refused token");
        }
        self.transition(SessionState::Anonymous);
    }

    /// Log out: forget user and token, in memory and in the store.
    pub(crate) fn clear<S: KeyValueStore>(&mut self, store: &S) -> Result<(), StoreError> {
        self.credentials = None;
        self.transition(SessionState::Anonymous);
        store.remove(keys::TOKEN)
    }

    fn transition(&mut self, to: SessionState) {
        if self.state != to {
            tracing::debug!(from = ?self.state, to = ?to, "session transition");
        }
        self.state = to;
    }
}
