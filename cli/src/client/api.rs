//! Linkdeck API client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::RetryTransientMiddleware;
use serde_json::Value;
use url::Url;

use crate::auth::{TokenPair, TokenRefresher, TokenStore};
use crate::client::middleware::{AuthMiddleware, TokenRefreshMiddleware};
use crate::client::{AuthRoutes, EndpointPath};
use crate::config::{ApiConfig, AuthConfig};
use crate::error::{LinkdeckError, Result};

/// Main API client for communicating with the link library backend.
pub struct ApiClient {
    client: ClientWithMiddleware,
    base_url: Url,
    routes: AuthRoutes,
    auth: AuthConfig,
    store: Arc<dyn TokenStore>,
    refresher: TokenRefresher,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the refresh URL
    /// is invalid.
    pub fn new(api: &ApiConfig, auth: &AuthConfig, store: Arc<dyn TokenStore>) -> Result<Self> {
        let inner_client = Client::builder()
            .user_agent(format!("linkdeck/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(api.timeout_secs))
            .build()?;

        let routes = AuthRoutes::new(api.base_url.clone(), auth);
        let refresher =
            TokenRefresher::new(Arc::clone(&store), inner_client.clone(), routes.refresh_url()?);
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(api.max_retries);

        // Build middleware stack
        let client = ClientBuilder::new(inner_client)
            .with(AuthMiddleware::new(
                routes.clone(),
                Arc::clone(&store),
                refresher.clone(),
            ))
            .with(TokenRefreshMiddleware::new(
                routes.clone(),
                Arc::clone(&store),
                refresher.clone(),
            ))
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            base_url: api.base_url.clone(),
            routes,
            auth: auth.clone(),
            store,
            refresher,
        })
    }

    /// Absolute URL for an API path.
    pub fn url_for(&self, path: &str) -> Result<Url> {
        self.routes.url_for(path)
    }

    /// Start a request to an API path, tagged with its logical endpoint path.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.url_for(path)?;
        Ok(self
            .client
            .request(method, url)
            .with_extension(EndpointPath(normalize(path))))
    }

    /// Log in with email and password. The issued tokens are stored by the
    /// middleware before this returns.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair> {
        self.issue_tokens(&self.auth.login_path, email, password)
            .await
    }

    /// Register a new account. The issued tokens are stored like a login.
    pub async fn register(&self, email: &str, password: &str) -> Result<TokenPair> {
        self.issue_tokens(&self.auth.register_path, email, password)
            .await
    }

    async fn issue_tokens(&self, path: &str, email: &str, password: &str) -> Result<TokenPair> {
        let body = serde_json::json!({ "email": email, "password": password });
        let response = self
            .request(Method::POST, path)?
            .json(&body)
            .send()
            .await?;

        let response = check_status(response).await?;
        let bytes = response.bytes().await?;
        Ok(TokenPair::from_slice(&bytes)?)
    }

    /// Forget stored tokens.
    pub async fn logout(&self) -> Result<()> {
        self.store.reset_tokens().await?;
        Ok(())
    }

    /// Whether a token pair is stored.
    pub async fn is_authenticated(&self) -> Result<bool> {
        Ok(self.store.get_tokens().await?.is_some())
    }

    /// Whether a token refresh is in flight.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.refresher.is_refreshing()
    }

    /// Send a JSON request and return the decoded body.
    ///
    /// Empty bodies decode to [`Value::Null`].
    pub async fn send_json(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let mut builder = self.request(method, path)?;
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = check_status(builder.send().await?).await?;
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

/// Map non-success responses onto [`LinkdeckError`].
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(LinkdeckError::Unauthorized);
    }
    if status == StatusCode::SERVICE_UNAVAILABLE {
        return Err(LinkdeckError::ApiUnavailable);
    }

    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(LinkdeckError::ApiError {
        status: status.as_u16(),
        message,
    })
}

fn normalize(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}
