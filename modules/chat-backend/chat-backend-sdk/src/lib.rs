//! Chat backend SDK
//!
//! Plain data types shared by the gateway client and its callers:
//!
//! - chat completion and resource (agent, thread, message, run) wire models
//! - [`ServerCredentials`] and the classified [`ValidationResult`]
//! - [`flow::KeyCreationState`], the key-creation form state machine

pub mod chat;
pub mod credentials;
pub mod flow;
pub mod resources;
pub mod validation;

pub use chat::{ChatCompletionRequest, ChatMessage};
pub use credentials::ServerCredentials;
pub use flow::{FlowError, KeyCreationState, KeyForm};
pub use resources::{
    Agent, CreateAgentRequest, CreateMessageRequest, CreateRunRequest, DeletionStatus,
    ListMessagesQuery, MessagePage, MessageRole, Run, SortOrder, Thread, ThreadMessage,
    UpdateAgentRequest,
};
pub use validation::{ValidationErrorKind, ValidationResult};
