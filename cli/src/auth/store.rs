//! Token storage abstraction.
//!
//! - [`TokenStore`] - Async get/set/reset of the current [`TokenPair`]
//! - [`MemoryTokenStore`] - Process-local implementation

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::auth::{AuthError, TokenPair};

/// Holder of the current token pair (enables mocking).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Returns the stored token pair, if any.
    async fn get_tokens(&self) -> Result<Option<TokenPair>, AuthError>;

    /// Replaces the stored token pair.
    async fn set_tokens(&self, tokens: &TokenPair) -> Result<(), AuthError>;

    /// Removes any stored tokens. No-op when nothing is stored.
    async fn reset_tokens(&self) -> Result<(), AuthError>;
}

/// In-memory token store. Tokens live as long as the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<Option<TokenPair>>,
}

impl MemoryTokenStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with a token pair.
    #[must_use]
    pub fn with_tokens(tokens: TokenPair) -> Self {
        Self {
            tokens: RwLock::new(Some(tokens)),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get_tokens(&self) -> Result<Option<TokenPair>, AuthError> {
        Ok(self.tokens.read().await.clone())
    }

    async fn set_tokens(&self, tokens: &TokenPair) -> Result<(), AuthError> {
        *self.tokens.write().await = Some(tokens.clone());
        Ok(())
    }

    async fn reset_tokens(&self) -> Result<(), AuthError> {
        *self.tokens.write().await = None;
        Ok(())
    }
}
