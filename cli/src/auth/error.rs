//! Authentication middleware error types.

use thiserror::Error;

/// Errors raised by the authentication middleware and token stores.
///
/// The type is `Clone` because a single refresh outcome is handed to every
/// request waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No access token was available when a protected request was about to be sent.
    #[error("missing access token")]
    MissingAccessToken,

    /// A 401 was received but no refresh token is stored.
    #[error("no refresh token")]
    MissingRefreshToken,

    /// A token-issuing endpoint returned a body without both tokens.
    #[error("invalid token response")]
    InvalidTokenResponse,

    /// The refresh call failed; stored tokens have been cleared.
    #[error("refresh failed: {0}")]
    RefreshFailed(String),

    /// A stored token cannot be used as an HTTP header value.
    #[error("stored token is not a valid header value")]
    MalformedToken,

    /// The token store backend failed.
    #[error("token store error: {0}")]
    Store(String),
}

impl AuthError {
    /// Recover an [`AuthError`] raised inside the middleware chain.
    #[must_use]
    pub fn from_middleware(err: &reqwest_middleware::Error) -> Option<&Self> {
        match err {
            reqwest_middleware::Error::Middleware(inner) => inner.downcast_ref::<Self>(),
            reqwest_middleware::Error::Reqwest(_) => None,
        }
    }
}

impl From<AuthError> for reqwest_middleware::Error {
    fn from(err: AuthError) -> Self {
        Self::middleware(err)
    }
}
