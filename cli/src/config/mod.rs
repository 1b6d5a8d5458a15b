//! Configuration management for linkdeck.

pub mod paths;
pub mod settings;

pub use paths::config_file;
pub use settings::{ApiConfig, AuthConfig, LinkdeckConfig, TokenStoreKind};

use std::path::Path;

use crate::error::{LinkdeckError, Result};

/// Load configuration from the default config file.
///
/// If the config file doesn't exist, returns default configuration.
pub fn load_config() -> Result<LinkdeckConfig> {
    let path = config_file()?;
    load_config_from(&path)
}

/// Load configuration from a specific path.
///
/// If the file doesn't exist, returns default configuration.
pub fn load_config_from(path: &Path) -> Result<LinkdeckConfig> {
    if !path.exists() {
        return Ok(LinkdeckConfig::default().with_env_overrides());
    }

    let contents = std::fs::read_to_string(path)?;
    let config: LinkdeckConfig =
        toml::from_str(&contents).map_err(|e| LinkdeckError::ConfigRead(e.to_string()))?;

    Ok(config.with_env_overrides())
}
