//! Command implementations.

pub mod auth;
pub mod request;

pub use auth::{handle_login, handle_logout, handle_register, handle_status};
pub use request::handle_request;

use std::sync::Arc;

use crate::auth::{KeyringTokenStore, MemoryTokenStore, TokenStore};
use crate::client::ApiClient;
use crate::config::{LinkdeckConfig, TokenStoreKind};
use crate::error::Result;

/// Build an API client backed by the configured token store.
pub fn open_client(config: &LinkdeckConfig) -> Result<ApiClient> {
    let store: Arc<dyn TokenStore> = match config.auth.token_store {
        TokenStoreKind::Keyring => Arc::new(KeyringTokenStore::new()?),
        TokenStoreKind::Memory => Arc::new(MemoryTokenStore::new()),
    };
    ApiClient::new(&config.api, &config.auth, store)
}
