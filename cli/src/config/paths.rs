//! Platform-specific path utilities for linkdeck.

use std::path::PathBuf;

use crate::error::{LinkdeckError, Result};

/// Get the configuration directory for linkdeck.
///
/// - Linux: `~/.config/linkdeck`
/// - macOS: `~/Library/Application Support/linkdeck`
/// - Windows: `%APPDATA%\linkdeck`
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir()
        .ok_or_else(|| LinkdeckError::Config("Cannot determine config directory".to_string()))?;
    Ok(base.join("linkdeck"))
}

/// Get the main configuration file path.
pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}
