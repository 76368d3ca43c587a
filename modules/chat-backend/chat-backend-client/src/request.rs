use std::time::Duration;

use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use url::Url;

use crate::error::GatewayError;

/// An outbound request against an absolute URL.
///
/// Bodies are buffered so a request can be re-sent by a retry policy.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Bytes>,
    timeout: Option<Duration>,
}

impl Request {
    #[must_use]
    pub fn builder(method: Method, url: Url) -> RequestBuilder {
        RequestBuilder {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
        }
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[derive(Debug)]
pub struct RequestBuilder {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Bytes>,
    timeout: Option<Duration>,
}

impl RequestBuilder {
    /// # Errors
    /// `GatewayError::Build` if the name or value is not a valid header.
    pub fn header<K, V>(mut self, key: K, value: V) -> Result<Self, GatewayError>
    where
        K: TryInto<HeaderName>,
        V: TryInto<HeaderValue>,
        K::Error: std::fmt::Display,
        V::Error: std::fmt::Display,
    {
        let key = key
            .try_into()
            .map_err(|e| GatewayError::Build(format!("Invalid header name: {e}")))?;
        let value = value
            .try_into()
            .map_err(|e| GatewayError::Build(format!("Invalid header value: {e}")))?;
        self.headers.insert(key, value);
        Ok(self)
    }

    /// `Authorization: Bearer <token>`, marked sensitive so it is not shown
    /// by `Debug`.
    ///
    /// # Errors
    /// `GatewayError::Build` if the token contains control characters.
    pub fn bearer_auth(mut self, token: &str) -> Result<Self, GatewayError> {
        let mut value = HeaderValue::try_from(format!("Bearer {token}")).map_err(|_| {
            GatewayError::Build("API key contains characters not allowed in a header".into())
        })?;
        value.set_sensitive(true);
        self.headers.insert(AUTHORIZATION, value);
        Ok(self)
    }

    /// Declare a JSON request without a body (empty `POST`s).
    #[must_use]
    pub fn json_content_type(mut self) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self
    }

    /// Serialize `value` as the body and set `Content-Type: application/json`.
    ///
    /// # Errors
    /// `GatewayError::Serialization` if `value` cannot be encoded.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self, GatewayError> {
        let body = serde_json::to_vec(value)?;
        let mut builder = self.json_content_type();
        builder.body = Some(Bytes::from(body));
        Ok(builder)
    }

    #[must_use]
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    #[must_use]
    pub fn build(self) -> Request {
        Request {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
            timeout: self.timeout,
        }
    }
}
