//! CLI module for linkdeck.

pub mod args;
pub mod commands;

pub use args::{AuthCommands, Cli, Commands};
