//! Token types for authentication.

use serde::{Deserialize, Serialize};

use crate::auth::AuthError;

/// Access/refresh token pair issued by the API.
///
/// Both fields are mandatory. A pair is only ever constructed from a body that
/// carried both tokens, so holders never see a half-populated credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived token sent as `Authorization: Bearer <access_token>`.
    pub access_token: String,
    /// Long-lived token exchanged at the refresh endpoint.
    pub refresh_token: String,
}

/// Wire shape of a token response before validation.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

impl TokenPair {
    /// Create a token pair from its parts.
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Parse and validate a token response body.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidTokenResponse`] if the body is not JSON or if
    /// either token is missing or empty.
    pub fn from_slice(body: &[u8]) -> Result<Self, AuthError> {
        let raw: RawTokenResponse =
            serde_json::from_slice(body).map_err(|_| AuthError::InvalidTokenResponse)?;

        match (raw.access_token, raw.refresh_token) {
            (Some(access), Some(refresh)) if !access.is_empty() && !refresh.is_empty() => {
                Ok(Self::new(access, refresh))
            },
            _ => Err(AuthError::InvalidTokenResponse),
        }
    }
}
