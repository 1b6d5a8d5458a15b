//! Secure token storage using the operating system keyring.
//!
//! This module provides platform-specific secure storage for API tokens:
//! - macOS: Keychain
//! - Linux: Secret Service (GNOME Keyring, `KWallet`)
//! - Windows: Credential Manager
//!
//! The token pair is stored as JSON in the keyring under a service-specific key.

use async_trait::async_trait;
use keyring::Entry;

use crate::auth::{AuthError, TokenPair, TokenStore};

const SERVICE_NAME: &str = "dev.linkdeck.cli";
const TOKENS_KEY: &str = "auth_tokens";

/// Token store backed by the OS keyring.
pub struct KeyringTokenStore {
    entry: Entry,
}

impl KeyringTokenStore {
    /// Creates a new keyring-backed token store.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Store`] if the keyring entry cannot be created,
    /// which may occur if the keyring service is unavailable or locked.
    pub fn new() -> Result<Self, AuthError> {
        let entry =
            Entry::new(SERVICE_NAME, TOKENS_KEY).map_err(|e| AuthError::Store(e.to_string()))?;
        Ok(Self { entry })
    }
}

#[async_trait]
impl TokenStore for KeyringTokenStore {
    async fn get_tokens(&self) -> Result<Option<TokenPair>, AuthError> {
        match self.entry.get_password() {
            Ok(json) => {
                let tokens: TokenPair = serde_json::from_str(&json)
                    .map_err(|e| AuthError::Store(format!("stored tokens are corrupted: {e}")))?;
                Ok(Some(tokens))
            },
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(AuthError::Store(e.to_string())),
        }
    }

    async fn set_tokens(&self, tokens: &TokenPair) -> Result<(), AuthError> {
        let json = serde_json::to_string(tokens).map_err(|e| AuthError::Store(e.to_string()))?;
        self.entry
            .set_password(&json)
            .map_err(|e| AuthError::Store(e.to_string()))
    }

    async fn reset_tokens(&self) -> Result<(), AuthError> {
        match self.entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(AuthError::Store(e.to_string())),
        }
    }
}
