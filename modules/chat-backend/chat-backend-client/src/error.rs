use bytes::Bytes;
use http::StatusCode;
use thiserror::Error;

/// Errors surfaced by [`GatewayClient`](crate::GatewayClient).
///
/// A non-success HTTP status always maps to `Http`, whichever endpoint was
/// called.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid base URL `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("request build error: {0}")]
    Build(String),

    #[error("HTTP error! status: {}", status.as_u16())]
    Http { status: StatusCode, body: Bytes },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Serialization(err.to_string())
    }
}

impl GatewayError {
    /// Status code carried by an `Http` error.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            GatewayError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The backend could not serve the call: it was unreachable or answered
    /// with a 5xx. Route handlers turn this into a 503 for the end user.
    #[must_use]
    pub fn is_backend_unavailable(&self) -> bool {
        match self {
            GatewayError::Transport(_) => true,
            GatewayError::Http { status, .. } => status.is_server_error(),
            _ => false,
        }
    }
}

/// Errors reading [`GatewayConfig`](crate::GatewayConfig) or
/// [`ValidatorConfig`](crate::ValidatorConfig) from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not valid unicode")]
    NotUnicode { var: &'static str },

    #[error("{var}: invalid duration `{value}`: {source}")]
    InvalidDuration {
        var: &'static str,
        value: String,
        #[source]
        source: humantime::DurationError,
    },

    #[error("{var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_exposes_status() {
        let err = GatewayError::Http {
            status: StatusCode::BAD_GATEWAY,
            body: Bytes::from_static(b"upstream down"),
        };
        assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
        assert!(err.is_backend_unavailable());
        assert_eq!(err.to_string(), "HTTP error! status: 502");
    }

    #[test]
    fn client_errors_are_not_unavailability() {
        let err = GatewayError::Http {
            status: StatusCode::NOT_FOUND,
            body: Bytes::new(),
        };
        assert!(!err.is_backend_unavailable());

        let err = GatewayError::InvalidResponse("bad utf-8".into());
        assert_eq!(err.status(), None);
        assert!(!err.is_backend_unavailable());
    }
}
