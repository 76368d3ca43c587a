use chat_backend_sdk::{ServerCredentials, ValidationErrorKind, ValidationResult};
use http::header::CONTENT_TYPE;
use http::{Method, StatusCode};
use tracing::{debug, info, warn};
use url::Url;

use crate::base_url::normalize_server_url;
use crate::config::ValidatorConfig;
use crate::error::GatewayError;
use crate::request::Request;
use crate::transport::HttpTransport;

const MSG_AUTH: &str = "Invalid API key or insufficient permissions";
const MSG_NOT_FOUND: &str = "Server endpoint not found. Please check the server URL.";
const MSG_SERVER_ERROR: &str = "Server error. Please try again later.";
const MSG_TIMEOUT: &str = "Connection timeout. Please check the server URL.";
const MSG_UNREACHABLE: &str =
    "Unable to connect to server. Please check the URL and your network connection.";

/// Checks a server URL / API key pair with a single bounded health probe.
#[derive(Debug, Clone)]
pub struct ConnectionValidator {
    transport: Option<HttpTransport>,
    config: ValidatorConfig,
}

impl Default for ConnectionValidator {
    fn default() -> Self {
        Self::new(ValidatorConfig::default())
    }
}

impl ConnectionValidator {
    #[must_use]
    pub fn new(config: ValidatorConfig) -> Self {
        // A transport that fails to initialise is reported per call, as a
        // network failure, so validation itself never errors.
        let transport = HttpTransport::new()
            .inspect_err(|e| warn!(error = %e, "HTTP transport unavailable for validation"))
            .ok();
        Self { transport, config }
    }

    #[must_use]
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Probe `<normalized server URL><health path>` with the candidate key.
    ///
    /// Never fails: every outcome, including a timeout, is a
    /// [`ValidationResult`].
    pub async fn validate_server_connection(
        &self,
        credentials: &ServerCredentials,
    ) -> ValidationResult {
        let target = probe_target(credentials.server_url(), &self.config.health_path);
        debug!(target = %target, timeout = ?self.config.timeout, "probing server");

        let result = self.probe(&target, credentials.api_key()).await;
        match &result {
            ValidationResult::Valid => info!(target = %target, "server connection validated"),
            ValidationResult::Invalid { kind, message } => {
                warn!(target = %target, error_type = %kind, error = %message, "server validation failed");
            }
        }
        result
    }

    async fn probe(&self, target: &str, api_key: &str) -> ValidationResult {
        let Some(transport) = &self.transport else {
            return connection_failed("HTTP transport unavailable");
        };
        let url = match Url::parse(target) {
            Ok(url) => url,
            Err(e) => return connection_failed(e),
        };
        let request = match Request::builder(Method::GET, url)
            .bearer_auth(api_key)
            .and_then(|b| b.header(CONTENT_TYPE, "application/json"))
        {
            Ok(builder) => builder.timeout(self.config.timeout).build(),
            Err(e) => return connection_failed(e),
        };

        // Dropping the in-flight future on elapse aborts the request.
        match tokio::time::timeout(self.config.timeout, transport.execute(&request)).await {
            Err(_elapsed) => ValidationResult::invalid(ValidationErrorKind::Timeout, MSG_TIMEOUT),
            Ok(Ok(response)) => classify_status(response.status()),
            Ok(Err(err)) => classify_error(&err),
        }
    }
}

/// Validate with the default configuration (10 second bound, `/health`).
pub async fn validate_server_connection(credentials: &ServerCredentials) -> ValidationResult {
    ConnectionValidator::default()
        .validate_server_connection(credentials)
        .await
}

fn probe_target(server_url: &str, health_path: &str) -> String {
    format!("{}{health_path}", normalize_server_url(server_url))
}

fn classify_status(status: StatusCode) -> ValidationResult {
    if status.is_success() {
        return ValidationResult::Valid;
    }
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ValidationResult::invalid(ValidationErrorKind::Auth, MSG_AUTH)
        }
        StatusCode::NOT_FOUND => {
            ValidationResult::invalid(ValidationErrorKind::InvalidUrl, MSG_NOT_FOUND)
        }
        s if s.as_u16() >= 500 => {
            ValidationResult::invalid(ValidationErrorKind::ServerError, MSG_SERVER_ERROR)
        }
        s => ValidationResult::invalid(
            ValidationErrorKind::ServerError,
            format!("Server returned status {}", s.as_u16()),
        ),
    }
}

fn classify_error(err: &GatewayError) -> ValidationResult {
    match err {
        GatewayError::Transport(e) if e.is_timeout() => {
            ValidationResult::invalid(ValidationErrorKind::Timeout, MSG_TIMEOUT)
        }
        GatewayError::Transport(e) if e.is_connect() => {
            ValidationResult::invalid(ValidationErrorKind::Network, MSG_UNREACHABLE)
        }
        other => connection_failed(other),
    }
}

fn connection_failed(cause: impl std::fmt::Display) -> ValidationResult {
    ValidationResult::invalid(
        ValidationErrorKind::Network,
        format!("Connection failed: {cause}"),
    )
}
