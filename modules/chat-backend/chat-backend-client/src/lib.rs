//! Chat backend gateway client
//!
//! Async client for the chat backend REST surface plus the connection check
//! run before a server URL / API key pair is saved.
//!
//! - [`GatewayClient`]: chat completions, agents, threads, messages and runs
//! - [`ConnectionValidator`]: bounded health probe returning a classified
//!   [`ValidationResult`]
//! - [`normalize_server_url`] / [`is_valid_url`]: offline URL handling
//!
//! # Streaming a chat completion
//!
//! ```no_run
//! use chat_backend_client::{ChatCompletionRequest, ChatMessage, GatewayClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GatewayClient::new(None)?;
//! let request = ChatCompletionRequest::new(vec![ChatMessage::user("Hello")]).with_stream(true);
//!
//! let mut sse = client.create_chat_completion(&request).await?.into_sse_stream();
//! while let Some(event) = sse.next_event().await? {
//!     if event.is_done() {
//!         break;
//!     }
//!     println!("{}", event.data);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Validating a server
//!
//! ```no_run
//! use chat_backend_client::{ConnectionValidator, ServerCredentials, ValidatorConfig};
//!
//! # async fn example() {
//! let validator = ConnectionValidator::new(ValidatorConfig::default());
//! let creds = ServerCredentials::new("chat.example.com/", "s-test123");
//! let result = validator.validate_server_connection(&creds).await;
//! if let Some(message) = result.error() {
//!     eprintln!("{message}");
//! }
//! # }
//! ```

mod base_url;
mod client;
mod config;
mod error;
mod request;
mod response;
mod retry;
mod sse;
mod transport;
mod validator;

pub use base_url::{BaseUrl, is_valid_url, normalize_server_url};
pub use client::GatewayClient;
pub use config::{
    DEFAULT_BASE_URL, DEFAULT_HEALTH_PATH, DEFAULT_VALIDATION_TIMEOUT, ENV_BASE_URL,
    ENV_HEALTH_PATH, ENV_VALIDATION_TIMEOUT, GatewayConfig, ValidatorConfig,
};
pub use error::{ConfigError, GatewayError};
pub use request::{Request, RequestBuilder};
pub use response::{BoxStream, ERROR_BODY_LIMIT, ERROR_BODY_TIMEOUT, Response};
pub use retry::{NoRetry, RetryPolicy};
pub use sse::{DONE_SENTINEL, SseEvent, SseEventStream};
pub use transport::HttpTransport;
pub use validator::{ConnectionValidator, validate_server_connection};

pub use chat_backend_sdk as sdk;
pub use chat_backend_sdk::{
    ChatCompletionRequest, ChatMessage, ServerCredentials, ValidationErrorKind, ValidationResult,
};

// Re-export commonly used types from dependencies
pub use http::{Method, StatusCode};
