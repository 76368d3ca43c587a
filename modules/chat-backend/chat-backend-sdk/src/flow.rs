//! Key-creation flow.
//!
//! ```text
//! Form --submit--> Validating --complete(valid)----> Succeeded
//!                       |
//!                       +----complete(invalid)--> Failed --retry--> Form
//! ```
//!
//! `reset` returns any state to an empty form. The validator itself is a
//! plain request/response function; this type only tracks where the caller
//! is in the flow.

use std::{fmt, mem};

use crate::credentials::ServerCredentials;
use crate::validation::{ValidationErrorKind, ValidationResult};

/// Fields the user fills in before a key can be validated.
///
/// `Debug` prints the key as `[REDACTED]`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct KeyForm {
    pub name: String,
    pub email: String,
    pub server_url: String,
    pub api_key: String,
}

impl KeyForm {
    /// All required fields are non-blank.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        [&self.name, &self.email, &self.server_url, &self.api_key]
            .iter()
            .all(|f| !f.trim().is_empty())
    }

    fn credentials(&self) -> ServerCredentials {
        ServerCredentials::new(self.server_url.trim(), self.api_key.trim())
    }
}

impl fmt::Debug for KeyForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyForm")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("server_url", &self.server_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyCreationState {
    Form(KeyForm),
    Validating(KeyForm),
    Succeeded(KeyForm),
    Failed {
        form: KeyForm,
        kind: ValidationErrorKind,
        message: String,
    },
}

impl Default for KeyCreationState {
    fn default() -> Self {
        Self::Form(KeyForm::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("required fields are missing")]
    IncompleteForm,
    #[error("the form can only be submitted or edited while it is being filled in")]
    NotInForm,
    #[error("no validation is in progress")]
    NotValidating,
    #[error("only a failed validation can be retried")]
    NotFailed,
}

impl KeyCreationState {
    #[must_use]
    pub fn form(&self) -> &KeyForm {
        match self {
            Self::Form(form)
            | Self::Validating(form)
            | Self::Succeeded(form)
            | Self::Failed { form, .. } => form,
        }
    }

    #[must_use]
    pub fn is_validating(&self) -> bool {
        matches!(self, Self::Validating(_))
    }

    /// Apply `f` to the form fields.
    ///
    /// # Errors
    /// `FlowError::NotInForm` outside the `Form` state.
    pub fn edit(&mut self, f: impl FnOnce(&mut KeyForm)) -> Result<(), FlowError> {
        match self {
            Self::Form(form) => {
                f(form);
                Ok(())
            }
            _ => Err(FlowError::NotInForm),
        }
    }

    /// Move to `Validating` and hand back the credentials to probe.
    ///
    /// # Errors
    /// `FlowError::IncompleteForm` when a required field is blank (the state
    /// is left unchanged), `FlowError::NotInForm` outside the `Form` state.
    pub fn submit(&mut self) -> Result<ServerCredentials, FlowError> {
        let Self::Form(form) = self else {
            return Err(FlowError::NotInForm);
        };
        if !form.is_complete() {
            return Err(FlowError::IncompleteForm);
        }
        let credentials = form.credentials();
        let form = mem::take(form);
        *self = Self::Validating(form);
        Ok(credentials)
    }

    /// Record the validator's answer.
    ///
    /// # Errors
    /// `FlowError::NotValidating` unless a validation is in flight.
    pub fn complete(&mut self, result: ValidationResult) -> Result<(), FlowError> {
        let Self::Validating(form) = self else {
            return Err(FlowError::NotValidating);
        };
        let form = mem::take(form);
        *self = match result {
            ValidationResult::Valid => Self::Succeeded(form),
            ValidationResult::Invalid { kind, message } => Self::Failed {
                form,
                kind,
                message,
            },
        };
        Ok(())
    }

    /// Go back to the form after a failed validation, keeping its contents.
    ///
    /// # Errors
    /// `FlowError::NotFailed` unless the last validation failed.
    pub fn retry(&mut self) -> Result<(), FlowError> {
        let Self::Failed { form, .. } = self else {
            return Err(FlowError::NotFailed);
        };
        let form = mem::take(form);
        *self = Self::Form(form);
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> KeyCreationState {
        let mut state = KeyCreationState::default();
        state
            .edit(|f| {
                f.name = "Jane Doe".into();
                f.email = "jane@example.com".into();
                f.server_url = " example.com ".into();
                f.api_key = "s-test123".into();
            })
            .unwrap();
        state
    }

    #[test]
    fn incomplete_form_cannot_be_submitted() {
        let mut state = KeyCreationState::default();
        state.edit(|f| f.name = "Jane".into()).unwrap();
        assert_eq!(state.submit().unwrap_err(), FlowError::IncompleteForm);
        assert!(matches!(state, KeyCreationState::Form(_)));
        assert_eq!(state.form().name, "Jane");
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let mut state = filled();
        assert!(!format!("{:?}", state.form()).contains("s-test123"));
        assert!(format!("{:?}", state.form()).contains("jane@example.com"));

        state.submit().unwrap();
        state
            .complete(ValidationResult::invalid(ValidationErrorKind::Auth, "rejected"))
            .unwrap();
        let printed = format!("{state:?}");
        assert!(printed.contains("[REDACTED]"));
        assert!(!printed.contains("s-test123"));
    }

    #[test]
    fn whitespace_only_fields_are_incomplete() {
        let form = KeyForm {
            name: "  ".into(),
            email: "a@b.c".into(),
            server_url: "example.com".into(),
            api_key: "k".into(),
        };
        assert!(!form.is_complete());
    }

    #[test]
    fn submit_then_success() {
        let mut state = filled();
        let creds = state.submit().unwrap();
        assert_eq!(creds.server_url(), "example.com");
        assert_eq!(creds.api_key(), "s-test123");
        assert!(state.is_validating());

        assert_eq!(state.edit(|f| f.name.clear()), Err(FlowError::NotInForm));
        assert_eq!(state.submit().unwrap_err(), FlowError::NotInForm);

        state.complete(ValidationResult::Valid).unwrap();
        assert!(matches!(state, KeyCreationState::Succeeded(_)));
        assert_eq!(state.form().email, "jane@example.com");
    }

    #[test]
    fn failure_then_retry_keeps_fields() {
        let mut state = filled();
        state.submit().unwrap();
        state
            .complete(ValidationResult::invalid(
                ValidationErrorKind::Auth,
                "Invalid API key or insufficient permissions",
            ))
            .unwrap();

        match &state {
            KeyCreationState::Failed { kind, message, .. } => {
                assert_eq!(*kind, ValidationErrorKind::Auth);
                assert!(message.contains("Invalid API key"));
            }
            other => panic!("unexpected state {other:?}"),
        }

        state.retry().unwrap();
        assert!(matches!(state, KeyCreationState::Form(_)));
        assert_eq!(state.form().api_key, "s-test123");
    }

    #[test]
    fn out_of_order_transitions_are_rejected() {
        let mut state = KeyCreationState::default();
        assert_eq!(
            state.complete(ValidationResult::Valid),
            Err(FlowError::NotValidating)
        );
        assert_eq!(state.retry(), Err(FlowError::NotFailed));

        let mut state = filled();
        state.submit().unwrap();
        assert_eq!(state.retry(), Err(FlowError::NotFailed));
    }

    #[test]
    fn reset_clears_everything() {
        let mut state = filled();
        state.submit().unwrap();
        state.complete(ValidationResult::Valid).unwrap();
        state.reset();
        assert_eq!(state, KeyCreationState::default());
    }
}
