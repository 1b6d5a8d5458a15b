//! Error types and result aliases for linkdeck.
//!
//! This module provides the application-level error type with:
//! - Specific error variants for different failure modes
//! - User-friendly error messages with recovery suggestions
//! - Helper methods for error classification
//! - Automatic conversion from common error types

use thiserror::Error;

use crate::auth::AuthError;

/// Main error type for linkdeck operations.
///
/// Use [`requires_reauth`](Self::requires_reauth) and [`is_retriable`](Self::is_retriable)
/// to determine appropriate error handling strategies.
#[derive(Error, Debug)]
pub enum LinkdeckError {
    /// Authentication middleware failure.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// API returned a non-success status code.
    #[error("API request failed ({status}): {message}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// API returned 401 even after refreshing the token.
    #[error("API server returned unauthorized (401). Run 'linkdeck auth login' to re-authenticate.")]
    Unauthorized,

    /// API server is unreachable (503 or connection failed).
    #[error("API server is unavailable. Check your network connection or try again later.")]
    ApiUnavailable,

    /// Request timed out.
    #[error("Request timed out. The server may be slow or unreachable. Try again later.")]
    Timeout,

    /// Network error during HTTP request.
    #[error("Network error: {0}. Check your internet connection.")]
    Network(String),

    /// General configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to read configuration file.
    #[error("Failed to read configuration file: {0}. Check file permissions and format.")]
    ConfigRead(String),

    /// IO operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("Data serialization error: {0}")]
    Serialization(String),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl LinkdeckError {
    /// Checks if this error can be resolved by logging in again.
    #[must_use]
    pub const fn requires_reauth(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized
                | Self::Auth(
                    AuthError::MissingAccessToken
                        | AuthError::MissingRefreshToken
                        | AuthError::RefreshFailed(_)
                )
        )
    }

    /// Checks if this error is transient and the operation might succeed on retry.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout | Self::ApiUnavailable)
    }
}

/// Result type alias using [`LinkdeckError`].
pub type Result<T> = std::result::Result<T, LinkdeckError>;

impl From<serde_json::Error> for LinkdeckError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(format!("JSON error: {err}"))
    }
}

impl From<reqwest::Error> for LinkdeckError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::ApiUnavailable
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<reqwest_middleware::Error> for LinkdeckError {
    fn from(err: reqwest_middleware::Error) -> Self {
        if let Some(auth) = AuthError::from_middleware(&err) {
            return Self::Auth(auth.clone());
        }

        match err {
            reqwest_middleware::Error::Reqwest(e) => e.into(),
            reqwest_middleware::Error::Middleware(e) => {
                let err_str = format!("{e:#}");
                if err_str.contains("timeout") || err_str.contains("timed out") {
                    Self::Timeout
                } else if err_str.contains("connect") || err_str.contains("connection") {
                    Self::ApiUnavailable
                } else {
                    Self::Network(err_str)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_user_friendly() {
        assert!(LinkdeckError::Unauthorized
            .to_string()
            .contains("linkdeck auth login"));
    }

    #[test]
    fn api_error_includes_status_and_message() {
        let err = LinkdeckError::ApiError {
            status: 404,
            message: "Not found".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("Not found"));
    }

    #[test]
    fn requires_reauth_identifies_auth_errors() {
        assert!(LinkdeckError::Auth(AuthError::MissingRefreshToken).requires_reauth());
        assert!(LinkdeckError::Unauthorized.requires_reauth());
        assert!(LinkdeckError::Auth(AuthError::MissingAccessToken).requires_reauth());
        assert!(
            LinkdeckError::Auth(AuthError::RefreshFailed("401".to_string())).requires_reauth()
        );

        assert!(!LinkdeckError::Auth(AuthError::InvalidTokenResponse).requires_reauth());
        assert!(!LinkdeckError::Timeout.requires_reauth());
    }

    #[test]
    fn is_retriable_identifies_transient_errors() {
        assert!(LinkdeckError::Timeout.is_retriable());
        assert!(LinkdeckError::ApiUnavailable.is_retriable());
        assert!(LinkdeckError::Network("test".to_string()).is_retriable());

        assert!(!LinkdeckError::Unauthorized.is_retriable());
        assert!(!LinkdeckError::Auth(AuthError::MissingRefreshToken).is_retriable());
    }

    #[test]
    fn middleware_auth_error_is_unwrapped() {
        let err: reqwest_middleware::Error = AuthError::InvalidTokenResponse.into();
        let linkdeck_err: LinkdeckError = err.into();
        assert!(matches!(
            linkdeck_err,
            LinkdeckError::Auth(AuthError::InvalidTokenResponse)
        ));
    }

    #[test]
    fn auth_errors_display_transparently() {
        let err = LinkdeckError::from(AuthError::MissingAccessToken);
        assert_eq!(err.to_string(), "missing access token");
    }

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: LinkdeckError = json_err.into();
        assert!(matches!(err, LinkdeckError::Serialization(_)));
    }

    #[test]
    fn from_url_parse_error() {
        let url_err = url::Url::parse("not a url").unwrap_err();
        let err: LinkdeckError = url_err.into();
        assert!(matches!(err, LinkdeckError::InvalidUrl(_)));
    }
}
