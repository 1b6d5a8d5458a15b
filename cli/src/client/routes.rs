//! Route policy for the authentication middleware.

use std::collections::HashSet;

use http::Extensions;
use reqwest::Request;
use url::Url;

use crate::config::AuthConfig;
use crate::error::{LinkdeckError, Result};

/// Logical API path of a request, e.g. `/auth/login`.
///
/// Attach it with `RequestBuilder::with_extension` when the URL path does not
/// map directly onto the API path (templated or rewritten routes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointPath(pub String);

/// Which paths need credentials, which issue them, and where to refresh.
#[derive(Debug, Clone)]
pub struct AuthRoutes {
    base_url: Url,
    refresh_path: String,
    public_paths: HashSet<String>,
    token_paths: HashSet<String>,
}

impl AuthRoutes {
    /// Build the route policy for an API rooted at `base_url`.
    #[must_use]
    pub fn new(base_url: Url, auth: &AuthConfig) -> Self {
        Self {
            base_url,
            refresh_path: auth.refresh_path.clone(),
            public_paths: auth.public_paths.iter().cloned().collect(),
            token_paths: auth.token_paths.iter().cloned().collect(),
        }
    }

    /// Absolute URL for an API path, keeping any path prefix of the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the joined URL is invalid.
    pub fn url_for(&self, path: &str) -> Result<Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(LinkdeckError::from)
    }

    /// Absolute URL of the refresh endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the joined URL is invalid.
    pub fn refresh_url(&self) -> Result<Url> {
        self.url_for(&self.refresh_path)
    }

    /// Resolve the logical path of a request.
    ///
    /// An [`EndpointPath`] extension wins; otherwise the base URL's path prefix
    /// is stripped from the request URL path.
    #[must_use]
    pub fn endpoint_path(&self, req: &Request, extensions: &Extensions) -> String {
        if let Some(EndpointPath(path)) = extensions.get::<EndpointPath>() {
            return path.clone();
        }

        let prefix = self.base_url.path().trim_end_matches('/');
        let full = req.url().path();
        let relative = full
            .strip_prefix(prefix)
            .filter(|rest| rest.is_empty() || rest.starts_with('/'))
            .unwrap_or(full);

        if relative.starts_with('/') {
            relative.to_string()
        } else {
            format!("/{relative}")
        }
    }

    /// Whether requests to `path` are sent without credentials.
    #[must_use]
    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths.contains(path)
    }

    /// Whether a successful response from `path` carries a new token pair.
    #[must_use]
    pub fn issues_tokens(&self, path: &str) -> bool {
        self.token_paths.contains(path)
    }
}
