//! Outbound event envelope and payloads.
//!
//! Each accepted operation produces exactly one envelope. Payloads are flat
//! projections of the triggering request plus denormalised case fields,
//! built fresh per call.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::case::CaseType;

/// Outbound event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    FulfilmentRequested,
    RefusalReceived,
    AddressNotValid,
    AddressModified,
    NewAddressReported,
    SurveyLaunched,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::FulfilmentRequested => "FULFILMENT_REQUESTED",
            EventType::RefusalReceived => "REFUSAL_RECEIVED",
            EventType::AddressNotValid => "ADDRESS_NOT_VALID",
            EventType::AddressModified => "ADDRESS_MODIFIED",
            EventType::NewAddressReported => "NEW_ADDRESS_REPORTED",
            EventType::SurveyLaunched => "SURVEY_LAUNCHED",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// System that raised the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Source {
    ContactCentreApi,
}

/// Channel the triggering interaction came through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Channel {
    Cc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventHeader {
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub source: Source,
    pub channel: Channel,
    pub date_time: DateTime<Utc>,
    pub transaction_id: Uuid,
}

/// Envelope handed to the event bus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventEnvelope {
    pub event: EventHeader,
    pub payload: EventPayload,
}

impl EventEnvelope {
    pub fn new(event_type: EventType, source: Source, channel: Channel, payload: EventPayload) -> Self {
        Self {
            event: EventHeader {
                event_type,
                source,
                channel,
                date_time: Utc::now(),
                transaction_id: Uuid::new_v4(),
            },
            payload,
        }
    }

    pub fn event_type(&self) -> EventType {
        self.event.event_type
    }
}

/// One payload per outbound event type.
///
/// Write-only: the variant is carried by the envelope header, not the
/// payload JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventPayload {
    FulfilmentRequest(FulfilmentRequest),
    Refusal(RefusalDetails),
    AddressNotValid(AddressNotValid),
    AddressModification(AddressModification),
    NewAddress(NewAddress),
    SurveyLaunched(SurveyLaunchedResponse),
}

impl EventPayload {
    /// The event type this payload is published under.
    pub fn event_type(&self) -> EventType {
        match self {
            EventPayload::FulfilmentRequest(_) => EventType::FulfilmentRequested,
            EventPayload::Refusal(_) => EventType::RefusalReceived,
            EventPayload::AddressNotValid(_) => EventType::AddressNotValid,
            EventPayload::AddressModification(_) => EventType::AddressModified,
            EventPayload::NewAddress(_) => EventType::NewAddressReported,
            EventPayload::SurveyLaunched(_) => EventType::SurveyLaunched,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub title: Option<String>,
    pub forename: Option<String>,
    pub surname: Option<String>,
    pub tel_no: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub address_line1: String,
    pub address_line2: String,
    pub address_line3: String,
    pub town_name: String,
    pub postcode: String,
    pub region: String,
    pub uprn: Option<String>,
    pub address_type: Option<String>,
    pub address_level: Option<String>,
    pub estab_type: Option<String>,
    pub organisation_name: Option<String>,
}

/// Address fields an agent may correct on an existing case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressCompact {
    pub address_line1: String,
    pub address_line2: String,
    pub address_line3: String,
    pub town_name: String,
    pub postcode: String,
    pub region: String,
    pub uprn: Option<String>,
    pub organisation_name: Option<String>,
    pub estab_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionCaseCompact {
    pub id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfilmentRequest {
    pub fulfilment_code: String,
    pub case_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub individual_case_id: Option<Uuid>,
    pub contact: Contact,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefusalDetails {
    #[serde(rename = "type")]
    pub refusal_type: String,
    pub report: Option<String>,
    pub agent_id: String,
    pub call_id: Option<String>,
    pub is_householder: bool,
    pub collection_case: CollectionCaseCompact,
    pub contact: Contact,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressNotValid {
    pub collection_case: CollectionCaseCompact,
    pub notes: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressModification {
    pub collection_case: CollectionCaseCompact,
    pub original_address: AddressCompact,
    pub new_address: AddressCompact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAddressCase {
    pub id: Uuid,
    pub case_type: CaseType,
    pub survey: String,
    pub ce_expected_capacity: Option<u32>,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAddress {
    pub source_case_id: Option<Uuid>,
    pub collection_case: NewAddressCase,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyLaunchedResponse {
    pub questionnaire_id: String,
    pub case_id: Uuid,
    pub agent_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_header_serialization() {
        let envelope = EventEnvelope::new(
            EventType::AddressNotValid,
            Source::ContactCentreApi,
            Channel::Cc,
            EventPayload::AddressNotValid(AddressNotValid {
                collection_case: CollectionCaseCompact { id: Uuid::nil() },
                notes: None,
                reason: "DEMOLISHED".to_string(),
            }),
        );
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["event"]["type"], "ADDRESS_NOT_VALID");
        assert_eq!(json["event"]["source"], "CONTACT_CENTRE_API");
        assert_eq!(json["event"]["channel"], "CC");
        assert_eq!(json["payload"]["reason"], "DEMOLISHED");
        assert_eq!(envelope.event_type(), envelope.payload.event_type());
    }

    #[test]
    fn test_payload_has_no_variant_tag() {
        let payload = EventPayload::AddressModification(AddressModification {
            collection_case: CollectionCaseCompact { id: Uuid::nil() },
            original_address: AddressCompact::default(),
            new_address: AddressCompact {
                address_line1: "1A Main Street".to_string(),
                ..AddressCompact::default()
            },
        });
        let json = serde_json::to_value(&payload).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 3);
        assert!(json.get("AddressModification").is_none());
        assert_eq!(json["newAddress"]["addressLine1"], "1A Main Street");
        assert_eq!(json["collectionCase"]["id"], Uuid::nil().to_string());
    }

    #[test]
    fn test_individual_case_id_omitted_when_absent() {
        let payload = FulfilmentRequest {
            fulfilment_code: "P_OR_H1".to_string(),
            case_id: Uuid::new_v4(),
            individual_case_id: None,
            contact: Contact::default(),
            address: Address::default(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("individualCaseId").is_none());
    }
}
