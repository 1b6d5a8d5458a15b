//! Authentication middleware for injecting Bearer tokens.

use std::sync::Arc;

use async_trait::async_trait;
use http::Extensions;
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next, Result};
use tracing::debug;

use super::set_bearer;
use crate::auth::{AuthError, TokenRefresher, TokenStore};
use crate::client::AuthRoutes;

/// Middleware that injects the Bearer token into protected requests.
///
/// Requests issued while a refresh is in flight wait for it to settle, so they
/// go out with the rotated token instead of provoking another 401.
pub struct AuthMiddleware {
    routes: AuthRoutes,
    store: Arc<dyn TokenStore>,
    refresher: TokenRefresher,
}

impl AuthMiddleware {
    /// Create a new authentication middleware.
    #[must_use]
    pub fn new(routes: AuthRoutes, store: Arc<dyn TokenStore>, refresher: TokenRefresher) -> Self {
        Self {
            routes,
            store,
            refresher,
        }
    }
}

#[async_trait]
impl Middleware for AuthMiddleware {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        let path = self.routes.endpoint_path(&req, extensions);
        if self.routes.is_public(&path) {
            debug!(%path, "public endpoint, sending without credentials");
            return next.run(req, extensions).await;
        }

        self.refresher.wait_for_refresh().await;

        let access_token = self
            .store
            .get_tokens()
            .await?
            .map(|tokens| tokens.access_token)
            .ok_or(AuthError::MissingAccessToken)?;

        set_bearer(&mut req, &access_token)?;
        debug!(%path, "attached bearer token");

        next.run(req, extensions).await
    }
}
