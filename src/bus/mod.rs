//! Outbound event publishing.
//!
//! This module contains:
//! - `EventPublisher` trait: delivery of event envelopes to the broker
//! - `RetryingPublisher`: bounded retry with backoff around any publisher
//! - `LoggingPublisher`: writes envelopes to the log, used when no broker
//!   transport is wired in
//! - `MockEventPublisher`: in-memory capture for tests

use std::sync::Arc;

use async_trait::async_trait;
use backon::Retryable;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::model::EventEnvelope;
use crate::utils::retry::publish_backoff;

pub mod mock;

pub use mock::MockEventPublisher;

// ============================================================================
// Traits
// ============================================================================

/// Result type for bus operations.
pub type Result<T> = std::result::Result<T, BusError>;

/// Errors that can occur while publishing.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Publish failed: {0}")]
    Publish(String),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BusError {
    /// Transport failures may clear up; a payload that cannot be encoded
    /// never will.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BusError::Connection(_) | BusError::Publish(_))
    }
}

/// Interface for event delivery.
///
/// The envelope is wrapped in Arc so retries resend the same immutable
/// event, transaction id included.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, envelope: Arc<EventEnvelope>) -> Result<()>;

    /// Publisher name for logging.
    fn name(&self) -> &str;
}

// ============================================================================
// Configuration
// ============================================================================

/// Publish retry configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Total attempts including the first. Default: 3
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

// ============================================================================
// Implementations
// ============================================================================

/// Retries a publisher with exponential backoff.
///
/// The last failure is returned once `max_attempts` is exhausted.
pub struct RetryingPublisher {
    inner: Arc<dyn EventPublisher>,
    config: PublishConfig,
}

impl RetryingPublisher {
    pub fn new(inner: Arc<dyn EventPublisher>, config: PublishConfig) -> Self {
        Self { inner, config }
    }
}

#[async_trait]
impl EventPublisher for RetryingPublisher {
    async fn publish(&self, envelope: Arc<EventEnvelope>) -> Result<()> {
        let event_type = envelope.event_type();
        let transaction_id = envelope.event.transaction_id;

        (|| async { self.inner.publish(Arc::clone(&envelope)).await })
            .retry(publish_backoff(&self.config))
            .when(BusError::is_retryable)
            .notify(|err, delay| {
                warn!(
                    publisher = %self.inner.name(),
                    event_type = %event_type,
                    %transaction_id,
                    error = %err,
                    delay_ms = delay.as_millis() as u64,
                    "Publish failed, retrying"
                );
            })
            .await?;

        debug!(
            publisher = %self.inner.name(),
            event_type = %event_type,
            %transaction_id,
            "Event published"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Writes each envelope to the log as JSON.
#[derive(Debug, Default)]
pub struct LoggingPublisher;

impl LoggingPublisher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventPublisher for LoggingPublisher {
    async fn publish(&self, envelope: Arc<EventEnvelope>) -> Result<()> {
        let json = serde_json::to_string(envelope.as_ref())?;
        info!(
            event_type = %envelope.event_type(),
            transaction_id = %envelope.event.transaction_id,
            payload = %json,
            "Event emitted"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "logging"
    }
}

#[cfg(test)]
mod tests;
