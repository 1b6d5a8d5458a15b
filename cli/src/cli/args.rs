//! Command-line argument parsing.

use clap::{Parser, Subcommand};

/// Command-line client for the link library API.
///
/// Tokens issued at login are kept in the configured token store and refreshed
/// automatically when the API reports them expired.
#[derive(Parser, Debug)]
#[command(name = "linkdeck")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage authentication.
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },

    /// Send an authenticated GET request and print the JSON response.
    Get {
        /// API path, e.g. `/links`.
        path: String,
    },

    /// Send an authenticated POST request.
    Post {
        /// API path, e.g. `/links`.
        path: String,

        /// JSON request body.
        #[arg(short, long)]
        data: Option<String>,
    },

    /// Send an authenticated PATCH request.
    Patch {
        /// API path, e.g. `/links/42`.
        path: String,

        /// JSON request body.
        #[arg(short, long)]
        data: Option<String>,
    },

    /// Send an authenticated DELETE request.
    Delete {
        /// API path, e.g. `/links/42`.
        path: String,
    },
}

/// Authentication subcommands.
#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Log in with email and password.
    Login {
        /// Account email.
        #[arg(short, long)]
        email: String,

        /// Account password.
        #[arg(short, long, env = "LINKDECK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and log in.
    Register {
        /// Account email.
        #[arg(short, long)]
        email: String,

        /// Account password.
        #[arg(short, long, env = "LINKDECK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Remove stored tokens.
    Logout,

    /// Show authentication status.
    Status,
}
