//! Linkdeck CLI - command-line client for the link library API.

use clap::Parser;
use reqwest::Method;
use tracing_subscriber::EnvFilter;

use linkdeck::cli::{self, AuthCommands, Cli, Commands};
use linkdeck::config::settings::env;
use linkdeck::error::Result;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(env::LOG_LEVEL)
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    // Run the command
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Auth { command } => match command {
            AuthCommands::Login { email, password } => {
                cli::commands::handle_login(&email, &password).await
            },
            AuthCommands::Register { email, password } => {
                cli::commands::handle_register(&email, &password).await
            },
            AuthCommands::Logout => cli::commands::handle_logout().await,
            AuthCommands::Status => cli::commands::handle_status().await,
        },
        Commands::Get { path } => cli::commands::handle_request(Method::GET, &path, None).await,
        Commands::Post { path, data } => {
            cli::commands::handle_request(Method::POST, &path, data.as_deref()).await
        },
        Commands::Patch { path, data } => {
            cli::commands::handle_request(Method::PATCH, &path, data.as_deref()).await
        },
        Commands::Delete { path } => {
            cli::commands::handle_request(Method::DELETE, &path, None).await
        },
    }
}
