//! Single-flight token refresh.
//!
//! At most one refresh call is outstanding at any time. Every caller that
//! observes a 401 while a refresh is running awaits the same shared outcome.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use crate::auth::{AuthError, TokenPair, TokenStore};

type RefreshOutcome = Result<(), AuthError>;
type SharedRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

/// Coordinates token refreshes across concurrent requests.
///
/// Cloning is cheap; clones share the same in-flight state.
#[derive(Clone)]
pub struct TokenRefresher {
    inner: Arc<RefresherInner>,
}

struct RefresherInner {
    store: Arc<dyn TokenStore>,
    client: Client,
    refresh_url: Url,
    state: Mutex<RefreshState>,
}

#[derive(Default)]
struct RefreshState {
    in_flight: Option<SharedRefresh>,
    /// Bumped every time a refresh stores a new token pair.
    generation: u64,
}

impl TokenRefresher {
    /// Create a refresher that posts to `refresh_url` using `client`.
    ///
    /// `client` must not carry the auth middleware, otherwise the refresh call
    /// would be intercepted itself.
    #[must_use]
    pub fn new(store: Arc<dyn TokenStore>, client: Client, refresh_url: Url) -> Self {
        Self {
            inner: Arc::new(RefresherInner {
                store,
                client,
                refresh_url,
                state: Mutex::new(RefreshState::default()),
            }),
        }
    }

    /// Whether a refresh is currently in flight.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.inner.state().in_flight.is_some()
    }

    /// Suspend until the in-flight refresh (if any) settles.
    ///
    /// The outcome is not returned; callers read the store afterwards.
    pub async fn wait_for_refresh(&self) {
        let pending = self.inner.state().in_flight.clone();
        if let Some(pending) = pending {
            debug!("waiting for in-flight token refresh");
            if let Err(e) = pending.await {
                debug!(error = %e, "awaited token refresh failed");
            }
        }
    }

    /// Refresh after a 401 for a request that carried `rejected_token`.
    ///
    /// Joins a refresh already in flight. If the store holds a different access
    /// token than the rejected one, or a refresh completed while the store was
    /// being read, the credential was already rotated and no refresh is started.
    pub async fn refresh_rejected(&self, rejected_token: Option<&str>) -> RefreshOutcome {
        let (pending, observed) = {
            let state = self.inner.state();
            (state.in_flight.clone(), state.generation)
        };
        if let Some(pending) = pending {
            return pending.await;
        }

        if let (Some(rejected), Some(current)) = (rejected_token, self.inner.store.get_tokens().await?) {
            if current.access_token != rejected {
                debug!("access token already rotated, skipping refresh");
                return Ok(());
            }
        }

        self.start_or_join(Some(observed)).await
    }

    /// Start a refresh, or join the one already in flight.
    pub async fn refresh(&self) -> RefreshOutcome {
        self.start_or_join(None).await
    }

    /// With `observed` set, a refresh that completed since that generation was
    /// read counts as this caller's refresh.
    async fn start_or_join(&self, observed: Option<u64>) -> RefreshOutcome {
        let pending = {
            let mut state = self.inner.state();
            if let Some(existing) = state.in_flight.as_ref() {
                existing.clone()
            } else if observed.is_some_and(|generation| generation != state.generation) {
                debug!("token refreshed while reading the store, skipping refresh");
                return Ok(());
            } else {
                let inner = Arc::clone(&self.inner);
                let refresh = async move {
                    let outcome = inner.run_refresh().await;
                    inner.settle(outcome.is_ok());
                    outcome
                }
                .boxed()
                .shared();
                state.in_flight = Some(refresh.clone());
                refresh
            }
        };

        pending.await
    }
}

impl RefresherInner {
    fn state(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn settle(&self, refreshed: bool) {
        let mut state = self.state();
        state.in_flight = None;
        if refreshed {
            state.generation = state.generation.wrapping_add(1);
        }
    }

    async fn run_refresh(&self) -> RefreshOutcome {
        let refresh_token = self
            .store
            .get_tokens()
            .await?
            .map(|tokens| tokens.refresh_token)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingRefreshToken)?;

        info!("refreshing access token");

        let persisted = match self.request_tokens(&refresh_token).await {
            Ok(tokens) => self
                .store
                .set_tokens(&tokens)
                .await
                .map_err(|e| e.to_string()),
            Err(reason) => Err(reason),
        };

        match persisted {
            Ok(()) => {
                info!("access token refreshed");
                Ok(())
            },
            Err(reason) => {
                warn!(%reason, "token refresh failed, clearing stored tokens");
                if let Err(e) = self.store.reset_tokens().await {
                    warn!(error = %e, "failed to clear stored tokens");
                }
                Err(AuthError::RefreshFailed(reason))
            },
        }
    }

    async fn request_tokens(&self, refresh_token: &str) -> Result<TokenPair, String> {
        let response = self
            .client
            .post(self.refresh_url.clone())
            .bearer_auth(refresh_token)
            .header(http::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("refresh endpoint returned {status}"));
        }

        let body = response.bytes().await.map_err(|e| e.to_string())?;
        TokenPair::from_slice(&body).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use futures::future::join_all;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::auth::{MemoryTokenStore, MockTokenStore};

    fn refresher_for(server: &MockServer, store: Arc<dyn TokenStore>) -> TokenRefresher {
        let url = Url::parse(&format!("{}/auth/refresh", server.uri())).unwrap();
        TokenRefresher::new(store, Client::new(), url)
    }

    #[tokio::test]
    async fn successful_refresh_persists_new_pair() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .and(header("authorization", "Bearer R1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"accessToken": "A2", "refreshToken": "R2"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::with_tokens(TokenPair::new("A1", "R1")));
        let refresher = refresher_for(&server, store.clone());

        tokio_test::assert_ok!(refresher.refresh().await);
        assert_eq!(
            store.get_tokens().await.unwrap(),
            Some(TokenPair::new("A2", "R2"))
        );
        assert!(!refresher.is_refreshing());
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"accessToken": "A2", "refreshToken": "R2"}))
                    .set_delay(Duration::from_millis(200)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::with_tokens(TokenPair::new("A1", "R1")));
        let refresher = refresher_for(&server, store);

        let outcomes = join_all((0..8).map(|_| refresher.refresh())).await;

        assert!(outcomes.iter().all(Result::is_ok));
        assert!(!refresher.is_refreshing());
    }

    #[tokio::test]
    async fn missing_refresh_token_skips_network_and_keeps_store() {
        let server = MockServer::start().await;
        Mock::given(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut store = MockTokenStore::new();
        store.expect_get_tokens().returning(|| Ok(None));
        store.expect_set_tokens().never();
        store.expect_reset_tokens().never();

        let refresher = refresher_for(&server, Arc::new(store));

        assert_eq!(
            refresher.refresh().await,
            Err(AuthError::MissingRefreshToken)
        );
        assert!(!refresher.is_refreshing());
    }

    #[tokio::test]
    async fn failed_refresh_resets_once_and_clears_marker() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(100)))
            .expect(2)
            .mount(&server)
            .await;

        let mut store = MockTokenStore::new();
        store
            .expect_get_tokens()
            .returning(|| Ok(Some(TokenPair::new("A1", "R1"))));
        store.expect_set_tokens().never();
        store.expect_reset_tokens().times(2).returning(|| Ok(()));

        let refresher = refresher_for(&server, Arc::new(store));

        // Three concurrent callers, one refresh, one reset.
        let outcomes = join_all((0..3).map(|_| refresher.refresh())).await;
        for outcome in &outcomes {
            assert!(matches!(outcome, Err(AuthError::RefreshFailed(_))));
        }
        assert!(!refresher.is_refreshing());

        // The marker is clear, so a later 401 starts a fresh attempt.
        assert!(matches!(
            refresher.refresh().await,
            Err(AuthError::RefreshFailed(_))
        ));
    }

    #[tokio::test]
    async fn malformed_refresh_body_fails_closed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "A2"})))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::with_tokens(TokenPair::new("A1", "R1")));
        let refresher = refresher_for(&server, store.clone());

        let err = refresher.refresh().await.unwrap_err();
        assert_eq!(
            err,
            AuthError::RefreshFailed("invalid token response".to_string())
        );
        assert_eq!(store.get_tokens().await.unwrap(), None);
    }

    #[tokio::test]
    async fn rotated_token_skips_refresh() {
        let server = MockServer::start().await;
        Mock::given(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::with_tokens(TokenPair::new("A2", "R2")));
        let refresher = refresher_for(&server, store);

        tokio_test::assert_ok!(refresher.refresh_rejected(Some("A1")).await);
    }

    /// Hands out its first snapshot only after a pause.
    struct SlowSnapshotStore {
        inner: MemoryTokenStore,
        paused: AtomicBool,
    }

    #[async_trait]
    impl TokenStore for SlowSnapshotStore {
        async fn get_tokens(&self) -> Result<Option<TokenPair>, AuthError> {
            let snapshot = self.inner.get_tokens().await?;
            if !self.paused.swap(true, Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_millis(300)).await;
            }
            Ok(snapshot)
        }

        async fn set_tokens(&self, tokens: &TokenPair) -> Result<(), AuthError> {
            self.inner.set_tokens(tokens).await
        }

        async fn reset_tokens(&self) -> Result<(), AuthError> {
            self.inner.reset_tokens().await
        }
    }

    #[tokio::test]
    async fn refresh_completed_during_store_read_is_not_repeated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .and(header("authorization", "Bearer R1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"accessToken": "A2", "refreshToken": "R2"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .and(header("authorization", "Bearer R2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"accessToken": "A3", "refreshToken": "R3"})),
            )
            .expect(0)
            .mount(&server)
            .await;

        let store = Arc::new(SlowSnapshotStore {
            inner: MemoryTokenStore::with_tokens(TokenPair::new("A1", "R1")),
            paused: AtomicBool::new(false),
        });
        let refresher = refresher_for(&server, store.clone());

        // The first caller still holds an "A1" snapshot when the second
        // caller's refresh has already rotated the pair.
        let (slow, fast) = tokio::join!(refresher.refresh_rejected(Some("A1")), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            refresher.refresh_rejected(Some("A1")).await
        });

        tokio_test::assert_ok!(slow);
        tokio_test::assert_ok!(fast);
        assert_eq!(
            store.inner.get_tokens().await.unwrap(),
            Some(TokenPair::new("A2", "R2"))
        );
        let refreshes = server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter(|r| r.url.path() == "/auth/refresh")
            .count();
        assert_eq!(refreshes, 1);
        assert!(!refresher.is_refreshing());
    }

    #[tokio::test]
    async fn refresh_rejected_joins_in_flight_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"accessToken": "A2", "refreshToken": "R2"}))
                    .set_delay(Duration::from_millis(200)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::with_tokens(TokenPair::new("A1", "R1")));
        let refresher = refresher_for(&server, store);

        let outcomes =
            join_all((0..4).map(|_| refresher.refresh_rejected(Some("A1")))).await;

        assert!(outcomes.iter().all(Result::is_ok));
        assert!(!refresher.is_refreshing());
    }

    #[tokio::test]
    async fn wait_for_refresh_returns_immediately_when_idle() {
        let store = Arc::new(MemoryTokenStore::new());
        let url = Url::parse("http://127.0.0.1:9/auth/refresh").unwrap();
        let refresher = TokenRefresher::new(store, Client::new(), url);

        tokio::time::timeout(Duration::from_millis(50), refresher.wait_for_refresh())
            .await
            .unwrap();
    }
}
