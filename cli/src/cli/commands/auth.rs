//! Authentication command handlers.

use crate::cli::commands::open_client;
use crate::config::load_config;
use crate::error::Result;

/// Handle the `linkdeck auth login` command.
pub async fn handle_login(email: &str, password: &str) -> Result<()> {
    let config = load_config()?;
    let client = open_client(&config)?;

    println!("Logging in to {} as {email}...", client.base_url());
    client.login(email, password).await?;
    println!("Successfully logged in.");

    Ok(())
}

/// Handle the `linkdeck auth register` command.
pub async fn handle_register(email: &str, password: &str) -> Result<()> {
    let config = load_config()?;
    let client = open_client(&config)?;

    println!("Creating account {email} on {}...", client.base_url());
    client.register(email, password).await?;
    println!("Account created and logged in.");

    Ok(())
}

/// Handle the `linkdeck auth logout` command.
pub async fn handle_logout() -> Result<()> {
    let config = load_config()?;
    let client = open_client(&config)?;

    if client.is_authenticated().await? {
        client.logout().await?;
        println!("Successfully logged out.");
    } else {
        println!("Not currently logged in.");
    }

    Ok(())
}

/// Handle the `linkdeck auth status` command.
pub async fn handle_status() -> Result<()> {
    let config = load_config()?;
    let client = open_client(&config)?;

    if client.is_authenticated().await? {
        println!("Logged in");
        println!();
        println!("  API Server:  {}", config.api.base_url);
        println!("  Token store: {:?}", config.auth.token_store);
    } else {
        println!("Not logged in");
        println!();
        println!("Run 'linkdeck auth login' to authenticate.");
    }

    Ok(())
}
