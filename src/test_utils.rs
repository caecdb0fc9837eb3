//! Test utilities and fixtures.
//!
//! Wires a `CaseService` over the in-memory mocks so tests can seed the
//! registry, address index and cache, then inspect what was published.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::bus::MockEventPublisher;
use crate::cache::InMemoryCaseCache;
use crate::clients::{MockAddressLookup, MockCaseRegistry, MockLaunchTokenEncoder};
use crate::config::{CaseEventsConfig, LaunchConfig};
use crate::model::{
    AddressRecord, CaseType, EstabType, EventEnvelope, NewCaseRequest, RegistryCase,
    RegistryCaseEvent, UniquePropertyReferenceNumber,
};
use crate::products::ProductReference;
use crate::service::{CaseService, Collaborators};

/// UPRN shared by the fixture cases.
pub const TEST_UPRN: u64 = 100041045018;
/// A Luhn-valid case reference.
pub const TEST_CASE_REF: &str = "1000000008";

pub fn test_uprn() -> UniquePropertyReferenceNumber {
    UniquePropertyReferenceNumber::new(TEST_UPRN).expect("fixture UPRN is valid")
}

/// Launch settings with a predictable URL.
pub fn test_launch_config() -> LaunchConfig {
    LaunchConfig {
        protocol: "https".to_string(),
        host: "eq.test".to_string(),
        path: "/session?token=".to_string(),
        ..Default::default()
    }
}

/// A registry case at [`TEST_UPRN`] with two events, one of them outside
/// the default whitelist.
pub fn registry_case(case_type: &str, estab_type: &str, region: &str) -> RegistryCase {
    RegistryCase {
        id: Uuid::new_v4(),
        case_ref: Some(TEST_CASE_REF.to_string()),
        case_type: case_type.to_string(),
        estab_type: Some(estab_type.to_string()),
        survey_type: Some("CENSUS".to_string()),
        region: region.to_string(),
        address_line1: "1 Main Street".to_string(),
        address_line2: "Upper Floor".to_string(),
        town_name: "Exeter".to_string(),
        postcode: "EX1 1AA".to_string(),
        uprn: Some(TEST_UPRN.to_string()),
        created_date_time: Some(Utc::now()),
        case_events: vec![
            RegistryCaseEvent {
                id: "1".to_string(),
                event_type: "CASE_CREATED".to_string(),
                description: "Case created".to_string(),
                created_date_time: Some(Utc::now()),
            },
            RegistryCaseEvent {
                id: "2".to_string(),
                event_type: "PRINT_CASE_SELECTED".to_string(),
                description: "Selected for print".to_string(),
                created_date_time: Some(Utc::now()),
            },
        ],
        ..Default::default()
    }
}

pub fn household_case() -> RegistryCase {
    registry_case("HH", "HOUSEHOLD", "E1000001")
}

pub fn communal_case() -> RegistryCase {
    let mut case = registry_case("CE", "CARE_HOME", "E1000001");
    case.organisation_name = "Sunny Views Care Home".to_string();
    case.ce_expected_capacity = Some(25);
    case
}

pub fn new_case_request(case_type: CaseType, estab_type: EstabType) -> NewCaseRequest {
    NewCaseRequest {
        case_type,
        estab_type,
        address_line1: "2 New Road".to_string(),
        address_line2: String::new(),
        address_line3: String::new(),
        town_name: "Cardiff".to_string(),
        postcode: "CF10 1AA".to_string(),
        region: "W".to_string(),
        uprn: Some(test_uprn()),
        organisation_name: String::new(),
        ce_usual_residents: (case_type == CaseType::CE).then_some(10),
        date_time: Utc::now(),
    }
}

pub fn address_record(census_address_type: &str, census_estab_type: &str) -> AddressRecord {
    AddressRecord {
        uprn: TEST_UPRN.to_string(),
        address_line1: "3 Index Lane".to_string(),
        address_line2: String::new(),
        address_line3: String::new(),
        town_name: "Belfast".to_string(),
        postcode: "BT1 1AA".to_string(),
        country_code: "N".to_string(),
        census_address_type: census_address_type.to_string(),
        census_estab_type: census_estab_type.to_string(),
        organisation_name: String::new(),
    }
}

/// A service over in-memory collaborators, with handles to each mock.
pub struct TestContext {
    pub registry: Arc<MockCaseRegistry>,
    pub address_lookup: Arc<MockAddressLookup>,
    pub cache: Arc<InMemoryCaseCache>,
    pub publisher: Arc<MockEventPublisher>,
    pub encoder: Arc<MockLaunchTokenEncoder>,
    pub service: CaseService,
}

impl TestContext {
    pub fn new() -> Self {
        let registry = Arc::new(MockCaseRegistry::new());
        let address_lookup = Arc::new(MockAddressLookup::new());
        let cache = Arc::new(InMemoryCaseCache::new());
        let publisher = Arc::new(MockEventPublisher::new());
        let encoder = Arc::new(MockLaunchTokenEncoder::new());
        let products =
            Arc::new(ProductReference::builtin().expect("builtin catalogue is valid"));

        let service = CaseService::new(
            Collaborators {
                registry: registry.clone(),
                address_lookup: address_lookup.clone(),
                cache: cache.clone(),
                publisher: publisher.clone(),
                products,
                encoder: encoder.clone(),
            },
            test_launch_config(),
            CaseEventsConfig::default().whitelisted_event_categories,
        );

        Self {
            registry,
            address_lookup,
            cache,
            publisher,
            encoder,
            service,
        }
    }

    /// Drain published envelopes.
    pub async fn published(&self) -> Vec<EventEnvelope> {
        self.publisher.take_published().await
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
