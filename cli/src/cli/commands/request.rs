//! Authenticated request command handlers (`get`, `post`, `patch`, `delete`).

use reqwest::Method;
use serde_json::Value;

use crate::cli::commands::open_client;
use crate::config::load_config;
use crate::error::{LinkdeckError, Result};

/// Send a request to `path` and print the JSON response.
pub async fn handle_request(method: Method, path: &str, data: Option<&str>) -> Result<()> {
    let body = data.map(parse_body).transpose()?;

    let config = load_config()?;
    let client = open_client(&config)?;

    let value = client.send_json(method, path, body.as_ref()).await?;
    if !value.is_null() {
        println!("{}", serde_json::to_string_pretty(&value)?);
    }

    Ok(())
}

fn parse_body(raw: &str) -> Result<Value> {
    serde_json::from_str(raw)
        .map_err(|e| LinkdeckError::Serialization(format!("request body is not valid JSON: {e}")))
}
