//! Stream a chat completion from the backend
//!
//! To run this example:
//! ```bash
//! export CHAT_BACKEND_URL="http://localhost:8000"  # Optional
//! cargo run --example stream_chat -- "Tell me a short story about a robot."
//! ```

use std::io::Write;

use chat_backend_client::{ChatCompletionRequest, ChatMessage, GatewayClient};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Say hello in three languages.".to_owned());

    let client = GatewayClient::new(None)?;
    tracing::info!(base_url = %client.base_url(), "connected");

    let request = ChatCompletionRequest::new(vec![ChatMessage::user(prompt)]).with_stream(true);
    let mut sse = client.create_chat_completion(&request).await?.into_sse_stream();

    let mut stdout = std::io::stdout();
    while let Some(event) = sse.next_event().await? {
        if event.is_done() {
            break;
        }
        let chunk: Value = event.json()?;
        if let Some(content) = chunk["choices"][0]["delta"]["content"].as_str() {
            print!("{content}");
            stdout.flush()?;
        }
    }
    println!();

    Ok(())
}
