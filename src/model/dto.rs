//! Agent-facing request and response shapes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::case::{CaseType, EstabType, UniquePropertyReferenceNumber};

/// Request to register an address the registry does not know about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCaseRequest {
    pub case_type: CaseType,
    pub estab_type: EstabType,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: String,
    #[serde(default)]
    pub address_line3: String,
    pub town_name: String,
    pub postcode: String,
    pub region: String,
    #[serde(default)]
    pub uprn: Option<UniquePropertyReferenceNumber>,
    #[serde(default)]
    pub organisation_name: String,
    #[serde(default)]
    pub ce_usual_residents: Option<u32>,
    pub date_time: DateTime<Utc>,
}

/// Fulfilment delivered by post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostalFulfilmentRequest {
    pub case_id: Uuid,
    pub fulfilment_code: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub forename: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
    pub date_time: DateTime<Utc>,
}

/// Fulfilment delivered by text message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsFulfilmentRequest {
    pub case_id: Uuid,
    pub fulfilment_code: String,
    pub telephone_number: String,
    pub date_time: DateTime<Utc>,
}

/// Request for an electronic questionnaire launch URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchRequest {
    pub agent_id: String,
    #[serde(default)]
    pub individual: bool,
}

/// Request for a fresh UAC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UacRequest {
    pub agent_id: String,
    #[serde(default)]
    pub individual: bool,
}

/// Why the respondent refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Reason {
    Hard,
    Extraordinary,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::Hard => f.write_str("HARD"),
            Reason::Extraordinary => f.write_str("EXTRAORDINARY"),
        }
    }
}

/// A refusal, possibly against an address with no known case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefusalRequest {
    pub agent_id: String,
    #[serde(default)]
    pub call_id: Option<String>,
    pub reason: Reason,
    #[serde(default)]
    pub is_householder: bool,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub forename: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub telephone_number: Option<String>,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: String,
    #[serde(default)]
    pub address_line3: String,
    pub town_name: String,
    pub postcode: String,
    pub region: String,
    #[serde(default)]
    pub uprn: Option<UniquePropertyReferenceNumber>,
    #[serde(default)]
    pub notes: Option<String>,
    pub date_time: DateTime<Utc>,
}

/// Status an agent reports for an address that is not a valid dwelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseStatus {
    Demolished,
    Derelict,
    Duplicate,
    Merged,
    NonResidential,
    Split,
    UnaddressableObject,
    UnderConstruction,
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CaseStatus::Demolished => "DEMOLISHED",
            CaseStatus::Derelict => "DERELICT",
            CaseStatus::Duplicate => "DUPLICATE",
            CaseStatus::Merged => "MERGED",
            CaseStatus::NonResidential => "NON_RESIDENTIAL",
            CaseStatus::Split => "SPLIT",
            CaseStatus::UnaddressableObject => "UNADDRESSABLE_OBJECT",
            CaseStatus::UnderConstruction => "UNDER_CONSTRUCTION",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidateCaseRequest {
    pub case_id: Uuid,
    pub status: CaseStatus,
    #[serde(default)]
    pub notes: Option<String>,
    pub date_time: DateTime<Utc>,
}

/// Correction to the address details of an existing case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyCaseRequest {
    pub case_id: Uuid,
    pub case_type: CaseType,
    pub estab_type: EstabType,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: String,
    #[serde(default)]
    pub address_line3: String,
    #[serde(default)]
    pub organisation_name: String,
    #[serde(default)]
    pub ce_usual_residents: Option<u32>,
    pub date_time: DateTime<Utc>,
}

/// Acknowledgement returned by mutating operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDto {
    pub id: String,
    pub date_time: DateTime<Utc>,
}

impl ResponseDto {
    pub fn now(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            date_time: Utc::now(),
        }
    }
}

/// A freshly issued UAC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UacResponse {
    pub id: Uuid,
    pub uac: String,
    pub questionnaire_id: String,
    pub form_type: String,
    pub date_time: DateTime<Utc>,
}
