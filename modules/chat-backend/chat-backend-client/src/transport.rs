use futures::TryStreamExt;
use tracing::debug;

use crate::error::GatewayError;
use crate::request::Request;
use crate::response::Response;

/// Thin wrapper over a pooled `reqwest::Client`.
///
/// Cloning shares the connection pool. No timeout is configured here;
/// callers opt in per request.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http_client: reqwest::Client,
}

impl HttpTransport {
    /// # Errors
    /// `GatewayError::Build` if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, GatewayError> {
        let http_client = reqwest::Client::builder()
            .build()
            .map_err(|e| GatewayError::Build(e.to_string()))?;
        Ok(Self { http_client })
    }

    /// Send `request` and hand back the response as soon as headers arrive.
    ///
    /// The status is not inspected. Dropping the returned future before it
    /// resolves aborts the request and frees its connection.
    ///
    /// # Errors
    /// `GatewayError::Transport` for DNS, connect, TLS or timeout failures.
    pub async fn execute(&self, request: &Request) -> Result<Response, GatewayError> {
        debug!(method = %request.method(), url = %request.url(), "sending backend request");

        let mut req_builder = self
            .http_client
            .request(request.method().clone(), request.url().clone())
            .headers(request.headers().clone());

        if let Some(timeout) = request.timeout() {
            req_builder = req_builder.timeout(timeout);
        }
        if let Some(body) = request.body() {
            req_builder = req_builder.body(body.clone());
        }

        let resp = req_builder.send().await?;

        let status = resp.status();
        let headers = resp.headers().clone();
        debug!(status = status.as_u16(), url = %request.url(), "backend responded");

        let stream = resp.bytes_stream().map_err(GatewayError::Transport);
        Ok(Response::new(status, headers, Box::pin(stream)))
    }
}
