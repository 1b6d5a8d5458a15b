//! HTTP client middleware.
//!
//! [`AuthMiddleware`] runs first and attaches credentials;
//! [`TokenRefreshMiddleware`] sits below it and reacts to responses.

pub mod auth;
pub mod refresh;

pub use auth::AuthMiddleware;
pub use refresh::TokenRefreshMiddleware;

use http::header::AUTHORIZATION;
use http::{HeaderMap, HeaderValue};
use reqwest::Request;

use crate::auth::AuthError;

/// Set `Authorization: Bearer <token>` on a request, replacing any previous value.
fn set_bearer(req: &mut Request, token: &str) -> Result<(), AuthError> {
    let mut value =
        HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| AuthError::MalformedToken)?;
    value.set_sensitive(true);
    req.headers_mut().insert(AUTHORIZATION, value);
    Ok(())
}

/// Bearer token carried by a request, if any.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}
