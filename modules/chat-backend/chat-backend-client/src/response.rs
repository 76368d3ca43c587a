use std::pin::Pin;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use futures::stream::Stream;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use tokio::time::Instant;

use crate::error::GatewayError;
use crate::sse::SseEventStream;

pub type BoxStream<T> = Pin<Box<dyn Stream<Item = T> + Send + 'static>>;

/// A live backend response.
///
/// Returned as-is by the streaming endpoints; the body has not been touched
/// when the caller receives it.
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: BoxStream<Result<Bytes, GatewayError>>,
}

impl std::fmt::Debug for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl Response {
    #[must_use]
    pub fn new(
        status: StatusCode,
        headers: HeaderMap,
        body: BoxStream<Result<Bytes, GatewayError>>,
    ) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// A response whose body is already in memory.
    #[must_use]
    pub fn from_bytes(status: StatusCode, headers: HeaderMap, bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self::new(
            status,
            headers,
            Box::pin(futures::stream::once(async move { Ok::<_, GatewayError>(bytes) })),
        )
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Pass 2xx responses through untouched; turn anything else into
    /// `GatewayError::Http`.
    ///
    /// Only a prefix of the error body is kept, at most `ERROR_BODY_LIMIT`
    /// bytes read within `ERROR_BODY_TIMEOUT`, so a body that never ends
    /// does not hold the error back.
    ///
    /// # Errors
    /// `GatewayError::Http` for a non-success status.
    pub async fn error_for_status(self) -> Result<Self, GatewayError> {
        if self.status.is_success() {
            return Ok(self);
        }
        let status = self.status;
        let body = read_prefix(self.body, ERROR_BODY_LIMIT, ERROR_BODY_TIMEOUT).await;
        Err(GatewayError::Http { status, body })
    }

    /// Consume the response and return the entire body.
    ///
    /// # Errors
    /// Propagates the first transport error from the body stream.
    pub async fn bytes(self) -> Result<Bytes, GatewayError> {
        let mut body = self.body;
        let mut buf = BytesMut::new();
        while let Some(chunk) = body.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }

    /// # Errors
    /// `GatewayError::InvalidResponse` if the body is not UTF-8.
    pub async fn text(self) -> Result<String, GatewayError> {
        let bytes = self.bytes().await?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| GatewayError::InvalidResponse(format!("Invalid UTF-8: {e}")))
    }

    /// # Errors
    /// `GatewayError::Serialization` if the body does not decode as `T`.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T, GatewayError> {
        let bytes = self.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// The body exactly as the transport produced it.
    #[must_use]
    pub fn into_stream(self) -> BoxStream<Result<Bytes, GatewayError>> {
        self.body
    }

    #[must_use]
    pub fn into_sse_stream(self) -> SseEventStream {
        SseEventStream::new(self.body)
    }
}

/// Error bodies are truncated to this many bytes.
pub const ERROR_BODY_LIMIT: usize = 8 * 1024;
/// Time allowed for reading an error body.
pub const ERROR_BODY_TIMEOUT: Duration = Duration::from_millis(500);

/// Whatever arrives within `wait`, up to `limit` bytes. Stream errors end the
/// read early.
async fn read_prefix(
    mut body: BoxStream<Result<Bytes, GatewayError>>,
    limit: usize,
    wait: Duration,
) -> Bytes {
    let deadline = Instant::now() + wait;
    let mut buf = BytesMut::new();
    while buf.len() < limit {
        match tokio::time::timeout_at(deadline, body.next()).await {
            Ok(Some(Ok(chunk))) => buf.extend_from_slice(&chunk),
            Ok(Some(Err(_)) | None) | Err(_) => break,
        }
    }
    buf.truncate(limit);
    buf.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chunked(chunks: &[&'static str]) -> Response {
        let items: Vec<Result<Bytes, GatewayError>> = chunks
            .iter()
            .map(|c| Ok(Bytes::from_static(c.as_bytes())))
            .collect();
        Response::new(
            StatusCode::OK,
            HeaderMap::new(),
            Box::pin(futures::stream::iter(items)),
        )
    }

    #[tokio::test]
    async fn bytes_concatenates_chunks() {
        let body = chunked(&["hel", "lo"]).bytes().await.unwrap();
        assert_eq!(body, Bytes::from_static(b"hello"));
    }

    #[tokio::test]
    async fn json_decodes_buffered_body() {
        let resp = Response::from_bytes(StatusCode::OK, HeaderMap::new(), r#"{"id":"t1"}"#);
        let value: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(value, json!({"id": "t1"}));
    }

    #[tokio::test]
    async fn text_rejects_invalid_utf8() {
        let resp = Response::from_bytes(StatusCode::OK, HeaderMap::new(), vec![0xff, 0xfe]);
        let err = resp.text().await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn error_for_status_keeps_success() {
        let resp = chunked(&["ok"]).error_for_status().await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.text().await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn error_for_status_captures_status_and_body() {
        let resp = Response::from_bytes(
            StatusCode::SERVICE_UNAVAILABLE,
            HeaderMap::new(),
            "maintenance",
        );
        let err = resp.error_for_status().await.unwrap_err();
        match err {
            GatewayError::Http { status, body } => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(body, Bytes::from_static(b"maintenance"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn error_for_status_does_not_wait_for_an_open_body() {
        let items: Vec<Result<Bytes, GatewayError>> = vec![Ok(Bytes::from_static(b"hello"))];
        let body = futures::stream::iter(items).chain(futures::stream::pending());
        let resp = Response::new(StatusCode::BAD_GATEWAY, HeaderMap::new(), Box::pin(body));

        let err = tokio::time::timeout(Duration::from_secs(5), resp.error_for_status())
            .await
            .expect("error_for_status should return once the read window closes")
            .unwrap_err();
        match err {
            GatewayError::Http { status, body } => {
                assert_eq!(status, StatusCode::BAD_GATEWAY);
                assert_eq!(body, Bytes::from_static(b"hello"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn error_body_is_truncated() {
        let big = vec![b'x'; ERROR_BODY_LIMIT * 2];
        let resp = Response::from_bytes(StatusCode::INTERNAL_SERVER_ERROR, HeaderMap::new(), big);
        match resp.error_for_status().await.unwrap_err() {
            GatewayError::Http { body, .. } => assert_eq!(body.len(), ERROR_BODY_LIMIT),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn into_stream_yields_original_chunks() {
        let mut stream = chunked(&["data: a\n\n", "data: b\n\n"]).into_stream();
        assert_eq!(stream.next().await.unwrap().unwrap(), "data: a\n\n");
        assert_eq!(stream.next().await.unwrap().unwrap(), "data: b\n\n");
        assert!(stream.next().await.is_none());
    }
}
