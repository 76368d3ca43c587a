use bytes::{Buf, Bytes, BytesMut};
use futures::StreamExt;
use serde::de::DeserializeOwned;

use crate::error::GatewayError;
use crate::response::BoxStream;

/// Terminal payload chat backends send after the last chunk.
pub const DONE_SENTINEL: &str = "[DONE]";

/// A parsed Server-Sent Event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub id: Option<String>,
    pub event: Option<String>,
    /// `data` lines joined with `\n`.
    pub data: String,
    /// Reconnection time in milliseconds.
    pub retry: Option<u64>,
}

impl SseEvent {
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.data.trim() == DONE_SENTINEL
    }

    /// Decode the data payload, e.g. a chat completion chunk.
    ///
    /// # Errors
    /// `GatewayError::Serialization` if `data` is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, GatewayError> {
        Ok(serde_json::from_str(&self.data)?)
    }
}

/// Reads events off a response body.
///
/// Nothing is read until [`next_event`](Self::next_event) is awaited, so the
/// caller controls backpressure.
pub struct SseEventStream {
    inner: BoxStream<Result<Bytes, GatewayError>>,
    buffer: BytesMut,
    finished: bool,
}

impl SseEventStream {
    #[must_use]
    pub fn new(stream: BoxStream<Result<Bytes, GatewayError>>) -> Self {
        Self {
            inner: stream,
            buffer: BytesMut::new(),
            finished: false,
        }
    }

    /// Next event with a `data` field; `Ok(None)` once the body ends.
    ///
    /// # Errors
    /// Transport errors from the body, or `GatewayError::InvalidResponse` for
    /// a block that is not UTF-8.
    pub async fn next_event(&mut self) -> Result<Option<SseEvent>, GatewayError> {
        loop {
            while let Some(block) = self.take_block() {
                if let Some(event) = parse_block(&block)? {
                    return Ok(Some(event));
                }
            }

            if self.finished {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                let rest = self.buffer.split();
                return parse_block(&rest);
            }

            match self.inner.next().await {
                Some(chunk) => self.buffer.extend_from_slice(&chunk?),
                None => self.finished = true,
            }
        }
    }

    /// Split off everything up to and including the next blank line.
    fn take_block(&mut self) -> Option<BytesMut> {
        let (end, sep_len) = find_blank_line(&self.buffer)?;
        let block = self.buffer.split_to(end);
        self.buffer.advance(sep_len);
        Some(block)
    }
}

/// Position of the first event terminator and its length: two consecutive
/// line breaks, each of which may be CRLF, LF or CR.
fn find_blank_line(buf: &[u8]) -> Option<(usize, usize)> {
    (0..buf.len()).find_map(|i| {
        let first = line_break_len(&buf[i..])?;
        let second = line_break_len(&buf[i + first..])?;
        Some((i, first + second))
    })
}

fn line_break_len(buf: &[u8]) -> Option<usize> {
    match buf {
        [b'\r', b'\n', ..] => Some(2),
        [b'\n' | b'\r', ..] => Some(1),
        _ => None,
    }
}

fn parse_block(block: &[u8]) -> Result<Option<SseEvent>, GatewayError> {
    let text = std::str::from_utf8(block)
        .map_err(|e| GatewayError::InvalidResponse(format!("Invalid UTF-8 in SSE: {e}")))?;

    let mut id = None;
    let mut event = None;
    let mut data: Option<String> = None;
    let mut retry = None;

    for line in text.split(['\n', '\r']) {
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "id" => id = Some(value.to_owned()),
            "event" => event = Some(value.to_owned()),
            "data" => match data.as_mut() {
                Some(buf) => {
                    buf.push('\n');
                    buf.push_str(value);
                }
                None => data = Some(value.to_owned()),
            },
            "retry" => retry = value.parse().ok().or(retry),
            _ => {}
        }
    }

    Ok(data.map(|data| SseEvent {
        id,
        event,
        data,
        retry,
    }))
}
