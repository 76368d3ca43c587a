use std::sync::Arc;

use chat_backend_sdk::{
    Agent, ChatCompletionRequest, CreateAgentRequest, CreateMessageRequest, CreateRunRequest,
    DeletionStatus, ListMessagesQuery, MessagePage, Run, Thread, ThreadMessage,
    UpdateAgentRequest,
};
use http::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::base_url::BaseUrl;
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::request::{Request, RequestBuilder};
use crate::response::Response;
use crate::retry::{NoRetry, RetryPolicy};
use crate::transport::HttpTransport;

/// Typed client for the chat backend REST surface.
///
/// The base URL is fixed at construction. Cloning is cheap and clones share
/// one connection pool; no other state is kept between calls.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    base_url: BaseUrl,
    transport: HttpTransport,
    retry: Arc<dyn RetryPolicy>,
}

impl GatewayClient {
    /// Client for `base_url`, or for the configured backend when `None`
    /// (`CHAT_BACKEND_URL`, falling back to `http://localhost:8000`).
    ///
    /// # Errors
    /// `GatewayError::InvalidBaseUrl` if the URL does not validate, or
    /// `GatewayError::Build` if the environment cannot be read.
    pub fn new(base_url: Option<&str>) -> Result<Self, GatewayError> {
        let config = match base_url {
            Some(url) => GatewayConfig::new(url),
            None => GatewayConfig::from_env().map_err(|e| GatewayError::Build(e.to_string()))?,
        };
        Self::from_config(&config)
    }

    /// # Errors
    /// `GatewayError::InvalidBaseUrl` if `config.base_url` does not validate.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            base_url: BaseUrl::parse(&config.base_url)?,
            transport: HttpTransport::new()?,
            retry: Arc::new(NoRetry),
        })
    }

    #[must_use]
    pub fn with_retry_policy(mut self, policy: impl RetryPolicy + 'static) -> Self {
        self.retry = Arc::new(policy);
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    // -- Chat --

    /// `POST /api/chat/completions`.
    ///
    /// The response is returned unread whether or not streaming was
    /// requested; use [`Response::into_sse_stream`] for `stream: true` and
    /// [`Response::json`] otherwise.
    ///
    /// # Errors
    /// `GatewayError::Http` carrying the status for any non-2xx answer.
    pub async fn create_chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<Response, GatewayError> {
        let req = self
            .builder(Method::POST, &["api", "chat", "completions"], &[])?
            .json(request)?
            .build();
        self.send(&req).await
    }

    // -- Agents --

    /// # Errors
    /// `GatewayError::Http` for any non-2xx answer.
    pub async fn create_agent(&self, params: &CreateAgentRequest) -> Result<Agent, GatewayError> {
        self.send_json(Method::POST, &["api", "agents"], Some(params)).await
    }

    /// # Errors
    /// `GatewayError::Http` for any non-2xx answer.
    pub async fn get_agent(&self, agent_id: &str) -> Result<Agent, GatewayError> {
        self.send_json(Method::GET, &["api", "agents", agent_id], None::<&()>).await
    }

    /// Only the fields set in `params` are sent.
    ///
    /// # Errors
    /// `GatewayError::Http` for any non-2xx answer.
    pub async fn update_agent(
        &self,
        agent_id: &str,
        params: &UpdateAgentRequest,
    ) -> Result<Agent, GatewayError> {
        self.send_json(Method::PATCH, &["api", "agents", agent_id], Some(params)).await
    }

    /// # Errors
    /// `GatewayError::Http` for any non-2xx answer.
    pub async fn delete_agent(&self, agent_id: &str) -> Result<DeletionStatus, GatewayError> {
        self.send_json(Method::DELETE, &["api", "agents", agent_id], None::<&()>).await
    }

    // -- Threads --

    /// # Errors
    /// `GatewayError::Http` for any non-2xx answer.
    pub async fn create_thread(&self) -> Result<Thread, GatewayError> {
        let req = self
            .builder(Method::POST, &["api", "threads"], &[])?
            .json_content_type()
            .build();
        self.send(&req).await?.json().await
    }

    /// # Errors
    /// `GatewayError::Http` for any non-2xx answer.
    pub async fn get_thread(&self, thread_id: &str) -> Result<Thread, GatewayError> {
        self.send_json(Method::GET, &["api", "threads", thread_id], None::<&()>).await
    }

    /// # Errors
    /// `GatewayError::Http` for any non-2xx answer.
    pub async fn delete_thread(&self, thread_id: &str) -> Result<DeletionStatus, GatewayError> {
        self.send_json(Method::DELETE, &["api", "threads", thread_id], None::<&()>).await
    }

    // -- Messages --

    /// # Errors
    /// `GatewayError::Http` for any non-2xx answer.
    pub async fn create_message(
        &self,
        thread_id: &str,
        params: &CreateMessageRequest,
    ) -> Result<ThreadMessage, GatewayError> {
        self.send_json(
            Method::POST,
            &["api", "threads", thread_id, "messages"],
            Some(params),
        )
        .await
    }

    /// Only the pagination fields that are set become query parameters.
    ///
    /// # Errors
    /// `GatewayError::Http` for any non-2xx answer.
    pub async fn get_messages(
        &self,
        thread_id: &str,
        query: Option<&ListMessagesQuery>,
    ) -> Result<MessagePage, GatewayError> {
        let pairs = query.map(ListMessagesQuery::to_pairs).unwrap_or_default();
        let req = self
            .builder(Method::GET, &["api", "threads", thread_id, "messages"], &pairs)?
            .build();
        self.send(&req).await?.json().await
    }

    // -- Runs --

    /// `POST /api/threads/:id/runs`.
    ///
    /// Like [`create_chat_completion`](Self::create_chat_completion), the
    /// response is handed back unread so a streamed run can be consumed
    /// incrementally.
    ///
    /// # Errors
    /// `GatewayError::Http` for any non-2xx answer.
    pub async fn create_run(
        &self,
        thread_id: &str,
        params: &CreateRunRequest,
    ) -> Result<Response, GatewayError> {
        let req = self
            .builder(Method::POST, &["api", "threads", thread_id, "runs"], &[])?
            .json(params)?
            .build();
        self.send(&req).await
    }

    /// # Errors
    /// `GatewayError::Http` for any non-2xx answer.
    pub async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<Run, GatewayError> {
        self.send_json(
            Method::GET,
            &["api", "threads", thread_id, "runs", run_id],
            None::<&()>,
        )
        .await
    }

    /// # Errors
    /// `GatewayError::Http` for any non-2xx answer.
    pub async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<Run, GatewayError> {
        self.send_json(
            Method::POST,
            &["api", "threads", thread_id, "runs", run_id, "cancel"],
            None::<&()>,
        )
        .await
    }

    // -- Plumbing --

    fn builder(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<RequestBuilder, GatewayError> {
        let url = self.base_url.endpoint(segments, query)?;
        Ok(Request::builder(method, url))
    }

    async fn send_json<B, T>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut builder = self.builder(method, segments, &[])?;
        if let Some(body) = body {
            builder = builder.json(body)?;
        }
        self.send(&builder.build()).await?.json().await
    }

    /// Execute with the retry policy; non-2xx statuses become
    /// `GatewayError::Http`.
    async fn send(&self, request: &Request) -> Result<Response, GatewayError> {
        let mut attempt = 0;
        loop {
            let outcome = match self.transport.execute(request).await {
                Ok(response) => response.error_for_status().await,
                Err(err) => Err(err),
            };
            let err = match outcome {
                Ok(response) => return Ok(response),
                Err(err) => err,
            };

            if let Some(status) = err.status() {
                warn!(
                    method = %request.method(),
                    url = %request.url(),
                    status = status.as_u16(),
                    "backend returned non-success status"
                );
            }
            match self.retry.next_delay(attempt, &err) {
                Some(delay) => {
                    debug!(attempt, ?delay, error = %err, "retrying backend request");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None => return Err(err),
            }
        }
    }
}
