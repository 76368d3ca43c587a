use serde::{Deserialize, Serialize};

/// One turn of conversation history as the backend expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }

    /// Flatten a multi-part UI message into a single text turn.
    ///
    /// Parts are joined with a newline.
    pub fn from_parts<I, S>(role: impl Into<String>, parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let content = parts
            .into_iter()
            .map(|p| p.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join("\n");
        Self::new(role, content)
    }
}

/// Body of `POST /api/chat/completions`.
///
/// Optional fields are omitted from the JSON when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatCompletionRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatCompletionRequest {
    #[must_use]
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            model: None,
            stream: None,
            temperature: None,
            max_tokens: None,
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = Some(stream);
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Whether the caller asked for an event-stream response.
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.stream.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn minimal_request_omits_optional_fields() {
        let req = ChatCompletionRequest::new(vec![ChatMessage::user("hi")]);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({"messages": [{"role": "user", "content": "hi"}]})
        );
        assert!(!req.is_streaming());
    }

    #[test]
    fn full_request_uses_camel_case_keys() {
        let req = ChatCompletionRequest::new(vec![ChatMessage::user("hi")])
            .with_model("gpt-4o")
            .with_stream(true)
            .with_temperature(0.5)
            .with_max_tokens(4000);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["model"], json!("gpt-4o"));
        assert_eq!(value["stream"], json!(true));
        assert_eq!(value["temperature"], json!(0.5));
        assert_eq!(value["maxTokens"], json!(4000));
        assert!(value.get("max_tokens").is_none());
        assert!(req.is_streaming());
    }

    #[test]
    fn from_parts_joins_with_newlines() {
        let msg = ChatMessage::from_parts("user", ["first", "second"]);
        assert_eq!(msg.role, "user");
        assert_eq!(msg.content, "first\nsecond");

        let empty = ChatMessage::from_parts("assistant", Vec::<String>::new());
        assert_eq!(empty.content, "");
    }
}
