//! Authentication error types.

use thiserror::Error;

use crate::api::ApiError;

/// Errors that can occur during login, registration or token checks.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required form field was left blank.
    #[error("{0} is required")]
    EmptyField(&'static str),

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] bodega_core::EmailError),

    /// Password too short.
    #[error("password must be at least {min} characters")]
    WeakPassword { min: usize },

    /// The auth service refused the request and said why.
    #[error("{0}")]
    Rejected(String),

    /// The auth service could not be reached or answered unexpectedly.
    #[error("auth service error: {0}")]
    Api(#[from] ApiError),
}

impl AuthError {
    /// Split a service failure into a refusal the user should read and a
    /// transport problem.
    pub(crate) fn from_service(err: ApiError) -> Self {
        match err {
            ApiError::Rejected(message) => Self::Rejected(message),
            ApiError::Status { status, message }
                if (400..500).contains(&status) && !message.is_empty() =>
            {
                Self::Rejected(message)
            }
            other => Self::Api(other),
        }
    }

    /// Whether the request was refused before any network call.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyField(_) | Self::InvalidEmail(_) | Self::WeakPassword { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_with_message_become_rejections() {
        let err = AuthError::from_service(ApiError::Status {
            status: 401,
            message: "Credenciales inválidas".to_string(),
        });
        assert!(matches!(err, AuthError::Rejected(ref m) if m == "Credenciales inválidas"));
        assert_eq!(err.to_string(), "Credenciales inválidas");
    }

    #[test]
    fn test_server_errors_stay_transport_errors() {
        let err = AuthError::from_service(ApiError::Status {
            status: 502,
            message: "bad gateway".to_string(),
        });
        assert!(matches!(err, AuthError::Api(_)));
        assert!(!err.is_validation());
    }

    #[test]
    fn test_validation_classification() {
        assert!(AuthError::EmptyField("name").is_validation());
        assert!(AuthError::WeakPassword { min: 6 }.is_validation());
        assert!(!AuthError::Rejected("no".to_string()).is_validation());
    }
}
