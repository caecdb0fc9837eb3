use super::*;
use crate::model::events::{AddressNotValid, CollectionCaseCompact};
use crate::model::{Channel, EventPayload, EventType, Source};
use uuid::Uuid;

fn make_envelope() -> Arc<EventEnvelope> {
    Arc::new(EventEnvelope::new(
        EventType::AddressNotValid,
        Source::ContactCentreApi,
        Channel::Cc,
        EventPayload::AddressNotValid(AddressNotValid {
            collection_case: CollectionCaseCompact { id: Uuid::new_v4() },
            notes: Some("gone".to_string()),
            reason: "DEMOLISHED".to_string(),
        }),
    ))
}

fn fast_config(max_attempts: u32) -> PublishConfig {
    PublishConfig {
        max_attempts,
        base_delay_ms: 1,
        max_delay_ms: 5,
    }
}

#[test]
fn test_publish_config_defaults() {
    let config = PublishConfig::default();
    assert_eq!(config.max_attempts, 3);
    assert_eq!(config.base_delay_ms, 100);
    assert_eq!(config.max_delay_ms, 2000);
}

#[test]
fn test_bus_error_retryable() {
    assert!(BusError::Connection("down".to_string()).is_retryable());
    assert!(BusError::Publish("nack".to_string()).is_retryable());

    let serde_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    assert!(!BusError::Serialization(serde_err).is_retryable());
}

#[tokio::test]
async fn test_retrying_publisher_recovers_from_transient_failure() {
    let mock = Arc::new(MockEventPublisher::new());
    mock.set_fail_times(2).await;
    let publisher = RetryingPublisher::new(mock.clone(), fast_config(3));

    let envelope = make_envelope();
    publisher.publish(envelope.clone()).await.unwrap();

    assert_eq!(mock.attempts().await, 3);
    let published = mock.take_published().await;
    assert_eq!(published.len(), 1);
    assert_eq!(
        published[0].event.transaction_id,
        envelope.event.transaction_id
    );
}

#[tokio::test]
async fn test_retrying_publisher_gives_up_after_max_attempts() {
    let mock = Arc::new(MockEventPublisher::new());
    mock.set_fail_on_publish(true).await;
    let publisher = RetryingPublisher::new(mock.clone(), fast_config(3));

    let result = publisher.publish(make_envelope()).await;

    assert!(matches!(result, Err(BusError::Connection(_))));
    assert_eq!(mock.attempts().await, 3);
    assert_eq!(mock.published_count().await, 0);
}

#[tokio::test]
async fn test_single_attempt_does_not_retry() {
    let mock = Arc::new(MockEventPublisher::new());
    mock.set_fail_times(1).await;
    let publisher = RetryingPublisher::new(mock.clone(), fast_config(1));

    assert!(publisher.publish(make_envelope()).await.is_err());
    assert_eq!(mock.attempts().await, 1);
}

#[tokio::test]
async fn test_logging_publisher_accepts_envelope() {
    let publisher = LoggingPublisher::new();
    assert!(publisher.publish(make_envelope()).await.is_ok());
    assert_eq!(publisher.name(), "logging");
}
