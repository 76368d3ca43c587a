//! Validate a server URL and API key the way the key-creation form does
//!
//! To run this example:
//! ```bash
//! export CHAT_BACKEND_VALIDATION_TIMEOUT="5s"  # Optional
//! cargo run --example check_connection -- chat.example.com s-your-key
//! ```

use chat_backend_client::{
    ConnectionValidator, ServerCredentials, ValidatorConfig, is_valid_url, normalize_server_url,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(server_url), Some(api_key)) = (args.next(), args.next()) else {
        anyhow::bail!("usage: check_connection <server-url> <api-key>");
    };

    if !is_valid_url(&server_url) {
        anyhow::bail!("`{server_url}` does not look like a server URL");
    }
    println!("Checking {}", normalize_server_url(&server_url));

    let validator = ConnectionValidator::new(ValidatorConfig::from_env()?);
    let result = validator
        .validate_server_connection(&ServerCredentials::new(server_url, api_key))
        .await;

    println!("{}", serde_json::to_string_pretty(&result)?);
    if let Some(message) = result.error() {
        anyhow::bail!("{message}");
    }
    Ok(())
}
