//! Token refresh middleware: token capture and 401 recovery.

use std::sync::Arc;

use async_trait::async_trait;
use http::Extensions;
use http_body_util::BodyExt;
use reqwest::{Request, Response, StatusCode};
use reqwest_middleware::{Middleware, Next, Result};
use tracing::{debug, warn};

use super::{bearer_token, set_bearer};
use crate::auth::{AuthError, TokenPair, TokenRefresher, TokenStore};
use crate::client::AuthRoutes;

/// Middleware that persists issued tokens and recovers from expired ones.
///
/// - A 2xx from a token-issuing path has its body validated and stored.
/// - A 401 from a protected path triggers (or joins) a single refresh, then the
///   request is replayed exactly once with the new access token.
pub struct TokenRefreshMiddleware {
    routes: AuthRoutes,
    store: Arc<dyn TokenStore>,
    refresher: TokenRefresher,
}

impl TokenRefreshMiddleware {
    /// Create a new token refresh middleware.
    #[must_use]
    pub fn new(routes: AuthRoutes, store: Arc<dyn TokenStore>, refresher: TokenRefresher) -> Self {
        Self {
            routes,
            store,
            refresher,
        }
    }

    /// Validate and store the token pair in a response body, then hand back an
    /// equivalent response.
    async fn capture_tokens(&self, response: Response) -> Result<Response> {
        let (parts, body) = http::Response::from(response).into_parts();
        let bytes = body.collect().await?.to_bytes();

        let tokens = TokenPair::from_slice(&bytes)?;
        self.store.set_tokens(&tokens).await?;
        debug!("stored issued token pair");

        Ok(Response::from(http::Response::from_parts(parts, bytes)))
    }
}

#[async_trait]
impl Middleware for TokenRefreshMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        let path = self.routes.endpoint_path(&req, extensions);
        let public = self.routes.is_public(&path);
        let replay = if public { None } else { req.try_clone() };
        let sent_token = bearer_token(req.headers());

        let response = next.clone().run(req, extensions).await?;
        let status = response.status();

        if status.is_success() {
            if self.routes.issues_tokens(&path) {
                return self.capture_tokens(response).await;
            }
            return Ok(response);
        }

        if status != StatusCode::UNAUTHORIZED || public {
            return Ok(response);
        }

        let Some(mut retry) = replay else {
            warn!(%path, "received 401 for a request whose body cannot be replayed");
            return Ok(response);
        };

        debug!(%path, "received 401, refreshing credentials");
        self.refresher
            .refresh_rejected(sent_token.as_deref())
            .await?;

        let access_token = self
            .store
            .get_tokens()
            .await?
            .map(|tokens| tokens.access_token)
            .ok_or(AuthError::MissingAccessToken)?;
        set_bearer(&mut retry, &access_token)?;

        debug!(%path, "retrying request with refreshed token");
        next.run(retry, extensions).await
    }
}
