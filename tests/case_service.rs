//! End-to-end case service scenarios over in-memory collaborators.
//!
//! Run with: cargo test --test case_service --features test-utils

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use ccsvc::bus::{MockEventPublisher, PublishConfig, RetryingPublisher};
use ccsvc::cache::{CaseCache, InMemoryCaseCache};
use ccsvc::clients::{MockAddressLookup, MockCaseRegistry, MockLaunchTokenEncoder};
use ccsvc::config::CaseEventsConfig;
use ccsvc::model::{
    CaseType, EstabType, EventPayload, EventType, LaunchRequest, PostalFulfilmentRequest,
    SmsFulfilmentRequest,
};
use ccsvc::products::ProductReference;
use ccsvc::service::{CaseService, Collaborators};
use ccsvc::test_utils::{
    address_record, household_case, new_case_request, test_launch_config, test_uprn, TestContext,
};

fn agent_launch(individual: bool) -> LaunchRequest {
    LaunchRequest {
        agent_id: "agent-7".to_string(),
        individual,
    }
}

// ============================================================================
// New address lifecycle
// ============================================================================

#[tokio::test]
async fn test_new_address_is_usable_until_registry_catches_up() {
    let ctx = TestContext::new();

    let created = ctx
        .service
        .create_case_for_new_address(new_case_request(CaseType::HH, EstabType::Household))
        .await
        .unwrap();

    let by_uprn = ctx.service.get_case_by_uprn(test_uprn(), false).await.unwrap();
    assert_eq!(by_uprn.len(), 1);
    assert_eq!(by_uprn[0].id, created.id);

    let by_id = ctx.service.get_case_by_id(created.id, false).await.unwrap();
    assert_eq!(by_id.postcode, "CF10 1AA");

    ctx.service
        .fulfilment_request_by_sms(SmsFulfilmentRequest {
            case_id: created.id,
            fulfilment_code: "UACHHT2W".to_string(),
            telephone_number: "07700900456".to_string(),
            date_time: Utc::now(),
        })
        .await
        .unwrap();

    let url = ctx
        .service
        .get_launch_url_for_case_id(created.id, agent_launch(false))
        .await
        .unwrap();
    assert!(url.starts_with("https://eq.test/session?token=token-"));

    let types: Vec<EventType> = ctx.published().await.iter().map(|e| e.event_type()).collect();
    assert_eq!(
        types,
        vec![
            EventType::NewAddressReported,
            EventType::FulfilmentRequested,
            EventType::SurveyLaunched,
        ]
    );
}

#[tokio::test]
async fn test_registry_case_shadows_cached_case() {
    let ctx = TestContext::new();
    let created = ctx
        .service
        .create_case_for_new_address(new_case_request(CaseType::HH, EstabType::Household))
        .await
        .unwrap();

    let registered = household_case();
    ctx.registry.insert(registered.clone()).await;

    let by_uprn = ctx.service.get_case_by_uprn(test_uprn(), false).await.unwrap();
    assert_eq!(by_uprn.len(), 1);
    assert_eq!(by_uprn[0].id, registered.id);
    assert_ne!(by_uprn[0].id, created.id);
}

#[tokio::test]
async fn test_address_index_case_is_created_once() {
    let ctx = TestContext::new();
    ctx.address_lookup
        .insert(test_uprn(), address_record("HH", "HOUSEHOLD"))
        .await;

    let first = ctx.service.get_case_by_uprn(test_uprn(), false).await.unwrap();
    let second = ctx.service.get_case_by_uprn(test_uprn(), false).await.unwrap();

    assert_eq!(first[0].id, second[0].id);
    assert_eq!(ctx.address_lookup.call_count().await, 1);
    assert_eq!(ctx.cache.len().await, 1);
    assert_eq!(
        ctx.publisher.published_types().await,
        vec![EventType::NewAddressReported]
    );
}

// ============================================================================
// Household journeys
// ============================================================================

#[tokio::test]
async fn test_individual_paper_and_launch_for_household() {
    let ctx = TestContext::new();
    let case = household_case();
    ctx.registry.insert(case.clone()).await;

    ctx.service
        .fulfilment_request_by_post(PostalFulfilmentRequest {
            case_id: case.id,
            fulfilment_code: "P_OR_I1".to_string(),
            title: Some("Dr".to_string()),
            forename: Some("Sam".to_string()),
            surname: Some("Jones".to_string()),
            date_time: Utc::now(),
        })
        .await
        .unwrap();
    ctx.service
        .get_launch_url_for_case_id(case.id, agent_launch(true))
        .await
        .unwrap();

    let published = ctx.published().await;
    assert_eq!(published.len(), 2);

    let fulfilment_individual = match &published[0].payload {
        EventPayload::FulfilmentRequest(p) => p.individual_case_id.unwrap(),
        other => panic!("expected fulfilment payload, got {:?}", other),
    };
    let launched_case = match &published[1].payload {
        EventPayload::SurveyLaunched(p) => p.case_id,
        other => panic!("expected survey launched payload, got {:?}", other),
    };

    // Each request mints its own individual case.
    assert_ne!(fulfilment_individual, case.id);
    assert_ne!(launched_case, case.id);
    assert_ne!(fulfilment_individual, launched_case);
}

#[tokio::test]
async fn test_every_envelope_has_contact_centre_header() {
    let ctx = TestContext::new();
    let case = household_case();
    ctx.registry.insert(case.clone()).await;

    ctx.service
        .get_launch_url_for_case_id(case.id, agent_launch(false))
        .await
        .unwrap();
    ctx.service
        .get_launch_url_for_case_id(case.id, agent_launch(false))
        .await
        .unwrap();

    let published = ctx.published().await;
    assert_eq!(published.len(), 2);
    assert_ne!(
        published[0].event.transaction_id,
        published[1].event.transaction_id
    );
    let json = serde_json::to_value(&published[0]).unwrap();
    assert_eq!(json["event"]["source"], "CONTACT_CENTRE_API");
    assert_eq!(json["event"]["channel"], "CC");
    assert_eq!(json["event"]["type"], "SURVEY_LAUNCHED");
}

// ============================================================================
// Publishing through the retrying publisher
// ============================================================================

#[tokio::test]
async fn test_transient_publish_failures_are_retried() {
    let registry = Arc::new(MockCaseRegistry::new());
    let publisher = Arc::new(MockEventPublisher::new());
    let cache = Arc::new(InMemoryCaseCache::new());
    let service = CaseService::new(
        Collaborators {
            registry: registry.clone(),
            address_lookup: Arc::new(MockAddressLookup::new()),
            cache: cache.clone(),
            publisher: Arc::new(RetryingPublisher::new(
                publisher.clone(),
                PublishConfig {
                    max_attempts: 3,
                    base_delay_ms: 1,
                    max_delay_ms: 5,
                },
            )),
            products: Arc::new(ProductReference::builtin().unwrap()),
            encoder: Arc::new(MockLaunchTokenEncoder::new()),
        },
        test_launch_config(),
        CaseEventsConfig::default().whitelisted_event_categories,
    );
    publisher.set_fail_times(2).await;

    let created = service
        .create_case_for_new_address(new_case_request(CaseType::CE, EstabType::CareHome))
        .await
        .unwrap();

    assert_eq!(publisher.attempts().await, 3);
    assert_eq!(publisher.published_count().await, 1);
    assert!(cache.read_by_id(created.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_unknown_case_reports_not_found_without_side_effects() {
    let ctx = TestContext::new();

    let err = ctx
        .service
        .get_launch_url_for_case_id(Uuid::new_v4(), agent_launch(false))
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 404);
    assert!(ctx.registry.qid_requests().await.is_empty());
    assert!(ctx.encoder.take_encoded().await.is_empty());
    assert_eq!(ctx.publisher.published_count().await, 0);
}
