//! Linkdeck - client for the link library API.
//!
//! The heart of the crate is the authentication middleware stack in
//! [`client::middleware`]: bearer tokens are attached to protected requests,
//! issued tokens are captured from login/register responses, and a 401 leads to
//! exactly one shared token refresh followed by a single retry.

pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
