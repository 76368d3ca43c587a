use secrecy::{ExposeSecret, SecretString};

/// A candidate server/API-key pair submitted for validation.
///
/// Request-scoped: built by the caller and consumed once by the validator.
/// The key is never printed by `Debug`.
#[derive(Debug)]
pub struct ServerCredentials {
    server_url: String,
    api_key: SecretString,
}

impl ServerCredentials {
    pub fn new(server_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            api_key: SecretString::from(api_key.into()),
        }
    }

    /// Server URL exactly as the user entered it (not normalized).
    #[must_use]
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}
