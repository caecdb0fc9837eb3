//! Retry utilities: backoff builders and retryable error classification.
//!
//! Uses `backon` for exponential backoff with jitter.

use std::time::Duration;

use backon::ExponentialBuilder;

use crate::bus::PublishConfig;

/// Backoff for collaborator HTTP calls.
///
/// - Min delay: 100ms
/// - Max delay: 2s
/// - Max retries: 3
/// - Jitter enabled
pub fn http_backoff() -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(100))
        .with_max_delay(Duration::from_secs(2))
        .with_max_times(3)
        .with_jitter()
}

/// Backoff for event publishing, sized from configuration.
///
/// `max_attempts` counts the first try, so the builder gets one fewer retry.
pub fn publish_backoff(config: &PublishConfig) -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(config.base_delay_ms))
        .with_max_delay(Duration::from_millis(config.max_delay_ms))
        .with_max_times(config.max_attempts.saturating_sub(1) as usize)
        .with_jitter()
}

/// Determines if an HTTP status from a collaborator is worth retrying.
///
/// Retryable: 429 (rate limit) and 5xx (server errors). A 404 or any other
/// 4xx will never succeed on retry.
pub fn is_retryable_status(status: u16) -> bool {
    status == 429 || (500..=599).contains(&status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_retryable_status() {
        assert!(is_retryable_status(429));
        assert!(is_retryable_status(500));
        assert!(is_retryable_status(503));

        assert!(!is_retryable_status(400));
        assert!(!is_retryable_status(401));
        assert!(!is_retryable_status(404));
        assert!(!is_retryable_status(200));
    }
}
