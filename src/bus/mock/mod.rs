//! Mock event publisher for testing.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{BusError, EventPublisher, Result};
use crate::model::{EventEnvelope, EventType};

/// Mock event publisher for testing.
#[derive(Default)]
pub struct MockEventPublisher {
    published: RwLock<Vec<EventEnvelope>>,
    fail_on_publish: RwLock<bool>,
    fail_times: RwLock<usize>,
    attempts: RwLock<usize>,
}

impl MockEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every publish until reset.
    pub async fn set_fail_on_publish(&self, fail: bool) {
        *self.fail_on_publish.write().await = fail;
    }

    /// Fail the next `times` publishes, then succeed.
    pub async fn set_fail_times(&self, times: usize) {
        *self.fail_times.write().await = times;
    }

    pub async fn published_count(&self) -> usize {
        self.published.read().await.len()
    }

    /// Publish calls seen, failed ones included.
    pub async fn attempts(&self) -> usize {
        *self.attempts.read().await
    }

    pub async fn take_published(&self) -> Vec<EventEnvelope> {
        std::mem::take(&mut *self.published.write().await)
    }

    pub async fn published_types(&self) -> Vec<EventType> {
        self.published
            .read()
            .await
            .iter()
            .map(EventEnvelope::event_type)
            .collect()
    }
}

#[async_trait]
impl EventPublisher for MockEventPublisher {
    async fn publish(&self, envelope: Arc<EventEnvelope>) -> Result<()> {
        *self.attempts.write().await += 1;
        if *self.fail_on_publish.read().await {
            return Err(BusError::Connection("Mock publish failure".to_string()));
        }
        {
            let mut remaining = self.fail_times.write().await;
            if *remaining > 0 {
                *remaining -= 1;
                return Err(BusError::Publish("Mock transient failure".to_string()));
            }
        }
        self.published.write().await.push((*envelope).clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::events::{AddressNotValid, CollectionCaseCompact};
    use crate::model::{Channel, EventPayload, Source};
    use uuid::Uuid;

    fn make_envelope() -> Arc<EventEnvelope> {
        Arc::new(EventEnvelope::new(
            EventType::AddressNotValid,
            Source::ContactCentreApi,
            Channel::Cc,
            EventPayload::AddressNotValid(AddressNotValid {
                collection_case: CollectionCaseCompact { id: Uuid::new_v4() },
                notes: None,
                reason: "DERELICT".to_string(),
            }),
        ))
    }

    #[tokio::test]
    async fn test_mock_publisher_publish() {
        let publisher = MockEventPublisher::new();

        publisher.publish(make_envelope()).await.unwrap();

        assert_eq!(publisher.published_count().await, 1);
        assert_eq!(
            publisher.published_types().await,
            vec![EventType::AddressNotValid]
        );
    }

    #[tokio::test]
    async fn test_mock_publisher_fail_on_publish() {
        let publisher = MockEventPublisher::new();
        publisher.set_fail_on_publish(true).await;

        let result = publisher.publish(make_envelope()).await;

        assert!(result.is_err());
        assert_eq!(publisher.published_count().await, 0);
        assert_eq!(publisher.attempts().await, 1);
    }

    #[tokio::test]
    async fn test_mock_publisher_take_published_drains() {
        let publisher = MockEventPublisher::new();
        publisher.publish(make_envelope()).await.unwrap();

        assert_eq!(publisher.take_published().await.len(), 1);
        assert_eq!(publisher.published_count().await, 0);
    }
}
