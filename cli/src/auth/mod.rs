//! Authentication module for linkdeck.
//!
//! This module provides the token model, token storage backends, and the
//! single-flight refresh coordinator shared by the HTTP middleware.

pub mod credentials;
pub mod error;
pub mod refresh;
pub mod store;
pub mod tokens;

pub use credentials::KeyringTokenStore;
pub use error::AuthError;
pub use refresh::TokenRefresher;
#[cfg(test)]
pub use store::MockTokenStore;
pub use store::{MemoryTokenStore, TokenStore};
pub use tokens::TokenPair;
