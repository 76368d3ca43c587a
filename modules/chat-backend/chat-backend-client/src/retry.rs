use std::fmt::Debug;
use std::time::Duration;

use crate::error::GatewayError;

/// Decides whether a failed backend call is attempted again.
///
/// Consulted after every failed attempt with the zero-based attempt number;
/// returning `Some(delay)` sleeps for `delay` and re-sends the same request.
pub trait RetryPolicy: Debug + Send + Sync {
    fn next_delay(&self, attempt: u32, error: &GatewayError) -> Option<Duration>;
}

/// Every call is attempted exactly once.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRetry;

impl RetryPolicy for NoRetry {
    fn next_delay(&self, _attempt: u32, _error: &GatewayError) -> Option<Duration> {
        None
    }
}
