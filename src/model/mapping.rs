//! Pure mappings between wire shapes, domain cases and event payloads.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::case::{
    AddressLevel, AddressType, CachedCase, Case, CaseEvent, CaseType, EstabType,
    UniquePropertyReferenceNumber, SURVEY_TYPE_CENSUS,
};
use super::dto::{ModifyCaseRequest, NewCaseRequest, RefusalRequest};
use super::events::{Address, AddressCompact};
use super::product::DeliveryChannel;
use super::wire::{AddressRecord, RegistryCase, RegistryCaseEvent};
use crate::validation::derive_address_type;

/// Keep only events whose category is whitelisted, order preserved.
pub fn filter_case_events(events: Vec<CaseEvent>, whitelist: &[String]) -> Vec<CaseEvent> {
    events
        .into_iter()
        .filter(|e| whitelist.iter().any(|w| w == &e.category))
        .collect()
}

fn case_event_from_registry(event: RegistryCaseEvent) -> CaseEvent {
    CaseEvent {
        id: event.id,
        category: event.event_type,
        description: event.description,
        created_date_time: event.created_date_time,
    }
}

fn parse_uprn(value: Option<&str>) -> Option<UniquePropertyReferenceNumber> {
    value.and_then(|v| UniquePropertyReferenceNumber::parse(v).ok())
}

fn non_empty(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Map a registry case into the agent-facing shape.
///
/// When `include_events` is false the events collection is absent, not
/// empty.
pub fn case_from_registry(
    registry: RegistryCase,
    include_events: bool,
    whitelist: &[String],
) -> Case {
    let case_type = CaseType::from_code(&registry.case_type);
    let estab_type = EstabType::from_code(registry.estab_type.as_deref().unwrap_or("OTHER"));
    let address_type = derive_address_type(estab_type, case_type);
    let address_level = registry
        .address_level
        .as_deref()
        .and_then(AddressLevel::from_code)
        .or_else(|| address_type.map(AddressType::address_level));
    let case_events = include_events.then(|| {
        let events = registry
            .case_events
            .into_iter()
            .map(case_event_from_registry)
            .collect();
        filter_case_events(events, whitelist)
    });

    Case {
        id: registry.id,
        case_ref: registry.case_ref,
        case_type,
        address_type,
        address_level,
        estab_type,
        survey_type: registry
            .survey_type
            .unwrap_or_else(|| SURVEY_TYPE_CENSUS.to_string()),
        region: registry.region,
        address_line1: registry.address_line1,
        address_line2: registry.address_line2,
        address_line3: registry.address_line3,
        town_name: registry.town_name,
        postcode: registry.postcode,
        organisation_name: registry.organisation_name,
        uprn: parse_uprn(registry.uprn.as_deref()),
        estab_uprn: parse_uprn(registry.estab_uprn.as_deref()),
        ce_usual_residents: registry.ce_expected_capacity,
        secure_establishment: registry.secure_establishment,
        created_date_time: registry.created_date_time,
        last_updated: registry.last_updated,
        allowed_delivery_channels: DeliveryChannel::ALL.to_vec(),
        case_events,
    }
}

/// Map a locally cached case into the agent-facing shape.
pub fn case_from_cached(cached: &CachedCase, include_events: bool) -> Case {
    Case {
        id: cached.id,
        case_ref: None,
        case_type: cached.case_type,
        address_type: Some(cached.address_type),
        address_level: Some(cached.address_type.address_level()),
        estab_type: cached.estab_type,
        survey_type: SURVEY_TYPE_CENSUS.to_string(),
        region: cached.region.clone(),
        address_line1: cached.address_line1.clone(),
        address_line2: cached.address_line2.clone(),
        address_line3: cached.address_line3.clone(),
        town_name: cached.town_name.clone(),
        postcode: cached.postcode.clone(),
        organisation_name: cached.organisation_name.clone(),
        uprn: cached.uprn,
        estab_uprn: None,
        ce_usual_residents: cached.ce_usual_residents,
        secure_establishment: false,
        created_date_time: Some(cached.created_date_time),
        last_updated: Some(cached.created_date_time),
        allowed_delivery_channels: DeliveryChannel::ALL.to_vec(),
        case_events: include_events.then(|| cached.case_events.clone()),
    }
}

/// Build the cache record for an agent-reported new address.
pub fn cached_case_from_request(
    request: &NewCaseRequest,
    id: Uuid,
    address_type: AddressType,
    now: DateTime<Utc>,
) -> CachedCase {
    CachedCase {
        id,
        uprn: request.uprn,
        case_type: request.case_type,
        address_type,
        estab_type: request.estab_type,
        region: request.region.clone(),
        address_line1: request.address_line1.clone(),
        address_line2: request.address_line2.clone(),
        address_line3: request.address_line3.clone(),
        town_name: request.town_name.clone(),
        postcode: request.postcode.clone(),
        organisation_name: request.organisation_name.clone(),
        ce_usual_residents: request.ce_usual_residents,
        created_date_time: now,
        case_events: Vec::new(),
    }
}

/// Build the cache record for an address found only in the address index.
///
/// Fails when the index reports a census address type outside HH/CE/SPG.
pub fn cached_case_from_address(
    record: &AddressRecord,
    uprn: UniquePropertyReferenceNumber,
    id: Uuid,
    now: DateTime<Utc>,
) -> Result<CachedCase, String> {
    let address_type = AddressType::from_code(&record.census_address_type).ok_or_else(|| {
        format!(
            "Address type '{}' of UPRN {} is not suitable for a new case",
            record.census_address_type, uprn
        )
    })?;
    let estab_type = EstabType::from_code(&record.census_estab_type);
    Ok(CachedCase {
        id,
        uprn: Some(uprn),
        case_type: address_type.case_type(),
        address_type,
        estab_type,
        region: record.country_code.clone(),
        address_line1: record.address_line1.clone(),
        address_line2: record.address_line2.clone(),
        address_line3: record.address_line3.clone(),
        town_name: record.town_name.clone(),
        postcode: record.postcode.clone(),
        organisation_name: record.organisation_name.clone(),
        ce_usual_residents: None,
        created_date_time: now,
        case_events: Vec::new(),
    })
}

pub fn address_from_case(case: &Case) -> Address {
    Address {
        address_line1: case.address_line1.clone(),
        address_line2: case.address_line2.clone(),
        address_line3: case.address_line3.clone(),
        town_name: case.town_name.clone(),
        postcode: case.postcode.clone(),
        region: case.region.clone(),
        uprn: case.uprn.map(|u| u.to_string()),
        address_type: case.address_type.map(|t| t.to_string()),
        address_level: case.address_level.map(|l| l.as_str().to_string()),
        estab_type: Some(case.estab_type.to_string()),
        organisation_name: non_empty(&case.organisation_name),
    }
}

pub fn address_from_cached(cached: &CachedCase) -> Address {
    Address {
        address_line1: cached.address_line1.clone(),
        address_line2: cached.address_line2.clone(),
        address_line3: cached.address_line3.clone(),
        town_name: cached.town_name.clone(),
        postcode: cached.postcode.clone(),
        region: cached.region.clone(),
        uprn: cached.uprn.map(|u| u.to_string()),
        address_type: Some(cached.address_type.to_string()),
        address_level: Some(cached.address_type.address_level().as_str().to_string()),
        estab_type: Some(cached.estab_type.to_string()),
        organisation_name: non_empty(&cached.organisation_name),
    }
}

pub fn address_from_refusal(request: &RefusalRequest) -> Address {
    Address {
        address_line1: request.address_line1.clone(),
        address_line2: request.address_line2.clone(),
        address_line3: request.address_line3.clone(),
        town_name: request.town_name.clone(),
        postcode: request.postcode.clone(),
        region: request.region.clone(),
        uprn: request.uprn.map(|u| u.to_string()),
        ..Address::default()
    }
}

pub fn address_compact_from_case(case: &Case) -> AddressCompact {
    AddressCompact {
        address_line1: case.address_line1.clone(),
        address_line2: case.address_line2.clone(),
        address_line3: case.address_line3.clone(),
        town_name: case.town_name.clone(),
        postcode: case.postcode.clone(),
        region: case.region.clone(),
        uprn: case.uprn.map(|u| u.to_string()),
        organisation_name: non_empty(&case.organisation_name),
        estab_type: Some(case.estab_type.to_string()),
    }
}

/// The corrected address: request fields over the untouched case fields.
pub fn address_compact_from_modify(request: &ModifyCaseRequest, original: &Case) -> AddressCompact {
    AddressCompact {
        address_line1: request.address_line1.clone(),
        address_line2: request.address_line2.clone(),
        address_line3: request.address_line3.clone(),
        organisation_name: non_empty(&request.organisation_name),
        estab_type: Some(request.estab_type.to_string()),
        ..address_compact_from_case(original)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_case(case_type: &str) -> RegistryCase {
        RegistryCase {
            id: Uuid::new_v4(),
            case_ref: Some("1000000008".to_string()),
            case_type: case_type.to_string(),
            estab_type: Some("CARE_HOME".to_string()),
            region: "E1000001".to_string(),
            address_line1: "1 The Care Home".to_string(),
            town_name: "Exeter".to_string(),
            postcode: "EX1 1AA".to_string(),
            uprn: Some("1347459999".to_string()),
            case_events: vec![
                RegistryCaseEvent {
                    id: "1".to_string(),
                    event_type: "CASE_CREATED".to_string(),
                    description: "Case created".to_string(),
                    created_date_time: None,
                },
                RegistryCaseEvent {
                    id: "2".to_string(),
                    event_type: "PRINT_CASE_SELECTED".to_string(),
                    description: "Printed".to_string(),
                    created_date_time: None,
                },
            ],
            ..RegistryCase::default()
        }
    }

    #[test]
    fn test_registry_case_derives_address_type_from_estab() {
        let case = case_from_registry(registry_case("CE"), false, &[]);
        assert_eq!(case.case_type, CaseType::CE);
        assert_eq!(case.estab_type, EstabType::CareHome);
        assert_eq!(case.address_type, Some(AddressType::CE));
        assert_eq!(case.address_level, Some(AddressLevel::E));
        assert_eq!(case.uprn.map(|u| u.value()), Some(1347459999));
        assert_eq!(case.allowed_delivery_channels, DeliveryChannel::ALL.to_vec());
    }

    #[test]
    fn test_registry_address_level_wins_over_derivation() {
        let mut registry = registry_case("CE");
        registry.address_level = Some("U".to_string());
        let case = case_from_registry(registry, false, &[]);
        assert_eq!(case.address_level, Some(AddressLevel::U));
    }

    #[test]
    fn test_events_absent_when_not_requested() {
        let case = case_from_registry(registry_case("HH"), false, &["CASE_CREATED".to_string()]);
        assert!(case.case_events.is_none());
        let json = serde_json::to_value(&case).unwrap();
        assert!(json.get("caseEvents").is_none());
    }

    #[test]
    fn test_events_filtered_by_whitelist() {
        let case = case_from_registry(registry_case("HH"), true, &["CASE_CREATED".to_string()]);
        let events = case.case_events.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].category, "CASE_CREATED");
    }

    #[test]
    fn test_cached_case_from_address_rejects_unsuitable_type() {
        let record = AddressRecord {
            census_address_type: "NA".to_string(),
            ..AddressRecord::default()
        };
        let uprn = UniquePropertyReferenceNumber::new(1).unwrap();
        assert!(cached_case_from_address(&record, uprn, Uuid::new_v4(), Utc::now()).is_err());
    }

    #[test]
    fn test_modified_address_keeps_untouched_fields() {
        let original = case_from_registry(registry_case("HH"), false, &[]);
        let request = ModifyCaseRequest {
            case_id: original.id,
            case_type: CaseType::HH,
            estab_type: EstabType::Household,
            address_line1: "Flat 1".to_string(),
            address_line2: "1 The Street".to_string(),
            address_line3: String::new(),
            organisation_name: String::new(),
            ce_usual_residents: None,
            date_time: Utc::now(),
        };
        let modified = address_compact_from_modify(&request, &original);
        assert_eq!(modified.address_line1, "Flat 1");
        assert_eq!(modified.postcode, "EX1 1AA");
        assert_eq!(modified.estab_type.as_deref(), Some("HOUSEHOLD"));
    }
}
