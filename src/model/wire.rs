//! Shapes exchanged with the registry, the address index and the launch
//! token service. Kept separate from the domain types so the mapping
//! between them stays explicit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::case::Case;

/// Case as returned by the case registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistryCase {
    pub id: Uuid,
    pub case_ref: Option<String>,
    pub case_type: String,
    pub address_type: Option<String>,
    pub address_level: Option<String>,
    pub estab_type: Option<String>,
    pub survey_type: Option<String>,
    pub region: String,
    pub address_line1: String,
    pub address_line2: String,
    pub address_line3: String,
    pub town_name: String,
    pub postcode: String,
    pub organisation_name: String,
    pub uprn: Option<String>,
    pub estab_uprn: Option<String>,
    pub ce_expected_capacity: Option<u32>,
    pub secure_establishment: bool,
    pub created_date_time: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub case_events: Vec<RegistryCaseEvent>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistryCaseEvent {
    pub id: String,
    pub event_type: String,
    pub description: String,
    pub created_date_time: Option<DateTime<Utc>>,
}

/// Single-use questionnaire id issued by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireId {
    pub questionnaire_id: String,
    pub uac: String,
    pub form_type: String,
}

/// Canonical address attributes from the address index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressRecord {
    pub uprn: String,
    pub address_line1: String,
    pub address_line2: String,
    pub address_line3: String,
    pub town_name: String,
    pub postcode: String,
    pub country_code: String,
    pub census_address_type: String,
    pub census_estab_type: String,
    pub organisation_name: String,
}

/// Everything the launch token service needs to build an EQ token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchData {
    pub language: String,
    pub source: String,
    pub channel: String,
    pub user_id: String,
    pub questionnaire_id: String,
    pub form_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub individual_case_id: Option<Uuid>,
    pub case_details: Case,
}
