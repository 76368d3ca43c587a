use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Why a server/API-key pair was rejected.
///
/// The set is exhaustive: every failure the validator can observe maps to
/// exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    /// Transport failure, and the catch-all for unexpected errors.
    Network,
    /// 401 / 403 from the probe.
    Auth,
    /// 404 from the probe.
    InvalidUrl,
    /// 5xx, and the catch-all for unrecognised non-success statuses.
    ServerError,
    /// The probe did not answer within the time budget.
    Timeout,
}

impl ValidationErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Auth => "auth",
            Self::InvalidUrl => "invalid_url",
            Self::ServerError => "server_error",
            Self::Timeout => "timeout",
        }
    }
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single connection validation.
///
/// Serializes to the `{ success, error?, errorType? }` shape the key-creation
/// UI consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid {
        kind: ValidationErrorKind,
        message: String,
    },
}

impl ValidationResult {
    #[must_use]
    pub fn invalid(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self::Invalid {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Valid)
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid { message, .. } => Some(message),
        }
    }

    #[must_use]
    pub fn error_type(&self) -> Option<ValidationErrorKind> {
        match self {
            Self::Valid => None,
            Self::Invalid { kind, .. } => Some(*kind),
        }
    }
}

impl Serialize for ValidationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Valid => {
                let mut s = serializer.serialize_struct("ValidationResult", 1)?;
                s.serialize_field("success", &true)?;
                s.end()
            }
            Self::Invalid { kind, message } => {
                let mut s = serializer.serialize_struct("ValidationResult", 3)?;
                s.serialize_field("success", &false)?;
                s.serialize_field("error", message)?;
                s.serialize_field("errorType", kind)?;
                s.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn valid_serializes_without_error_fields() {
        let value = serde_json::to_value(ValidationResult::Valid).unwrap();
        assert_eq!(value, json!({"success": true}));
    }

    #[test]
    fn invalid_serializes_category_in_snake_case() {
        let result = ValidationResult::invalid(
            ValidationErrorKind::InvalidUrl,
            "Server endpoint not found. Please check the server URL.",
        );
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({
                "success": false,
                "error": "Server endpoint not found. Please check the server URL.",
                "errorType": "invalid_url"
            })
        );
    }

    #[test]
    fn accessors_follow_variant() {
        let ok = ValidationResult::Valid;
        assert!(ok.is_success());
        assert_eq!(ok.error(), None);
        assert_eq!(ok.error_type(), None);

        let failed = ValidationResult::invalid(ValidationErrorKind::Timeout, "slow");
        assert!(!failed.is_success());
        assert_eq!(failed.error(), Some("slow"));
        assert_eq!(failed.error_type(), Some(ValidationErrorKind::Timeout));
    }

    #[test]
    fn display_matches_wire_name() {
        for kind in [
            ValidationErrorKind::Network,
            ValidationErrorKind::Auth,
            ValidationErrorKind::InvalidUrl,
            ValidationErrorKind::ServerError,
            ValidationErrorKind::Timeout,
        ] {
            let wire = serde_json::to_value(kind).unwrap();
            assert_eq!(wire, json!(kind.to_string()));
        }
    }
}
