//! Case shapes and the closed enums that classify them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::product::DeliveryChannel;

/// Largest UPRN the address index will ever assign (12 digits).
pub const MAX_UPRN: u64 = 999_999_999_999;

/// Survey type carried by continuous-survey cases.
pub const SURVEY_TYPE_CCS: &str = "CCS";
/// Survey type carried by regular census cases.
pub const SURVEY_TYPE_CENSUS: &str = "CENSUS";

/// Case type as held by the registry.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseType {
    /// Household.
    HH,
    /// Communal establishment.
    CE,
    /// Special population group.
    SPG,
    /// Household individual.
    HI,
    /// Anything the registry sends that this service does not recognise.
    #[serde(other)]
    Unknown,
}

impl CaseType {
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "HH" => CaseType::HH,
            "CE" => CaseType::CE,
            "SPG" => CaseType::SPG,
            "HI" => CaseType::HI,
            _ => CaseType::Unknown,
        }
    }

    /// Case types an agent may be shown directly.
    pub fn is_agent_visible(self) -> bool {
        matches!(self, CaseType::HH | CaseType::CE)
    }

    /// The address type a case of this type sits on when the estab type
    /// does not say otherwise.
    pub fn natural_address_type(self) -> Option<AddressType> {
        match self {
            CaseType::HH | CaseType::HI => Some(AddressType::HH),
            CaseType::CE => Some(AddressType::CE),
            CaseType::SPG => Some(AddressType::SPG),
            CaseType::Unknown => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CaseType::HH => "HH",
            CaseType::CE => "CE",
            CaseType::SPG => "SPG",
            CaseType::HI => "HI",
            CaseType::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for CaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address type, derived from the estab type.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressType {
    HH,
    CE,
    SPG,
}

impl AddressType {
    /// Parse the census address type reported by the address index.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "HH" => Some(AddressType::HH),
            "CE" => Some(AddressType::CE),
            "SPG" => Some(AddressType::SPG),
            _ => None,
        }
    }

    /// The case type a brand-new case on this address type gets.
    pub fn case_type(self) -> CaseType {
        match self {
            AddressType::HH => CaseType::HH,
            AddressType::CE => CaseType::CE,
            AddressType::SPG => CaseType::SPG,
        }
    }

    pub fn address_level(self) -> AddressLevel {
        match self {
            AddressType::CE => AddressLevel::E,
            AddressType::HH | AddressType::SPG => AddressLevel::U,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AddressType::HH => "HH",
            AddressType::CE => "CE",
            AddressType::SPG => "SPG",
        }
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an address is a single unit or a whole establishment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressLevel {
    /// Unit.
    U,
    /// Establishment.
    E,
}

impl AddressLevel {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "U" | "u" => Some(AddressLevel::U),
            "E" | "e" => Some(AddressLevel::E),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AddressLevel::U => "U",
            AddressLevel::E => "E",
        }
    }
}

/// Census region, the first character of a case's region code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    /// England.
    E,
    /// Wales.
    W,
    /// Northern Ireland.
    N,
}

impl Region {
    /// Derive the region from a region code such as `E1000001`.
    pub fn from_region_code(code: &str) -> Option<Self> {
        match code.trim_start().chars().next()?.to_ascii_uppercase() {
            'E' => Some(Region::E),
            'W' => Some(Region::W),
            'N' => Some(Region::N),
            _ => None,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Region::E => "E",
            Region::W => "W",
            Region::N => "N",
        };
        f.write_str(s)
    }
}

/// Establishment type classifying the premises.
///
/// Every variant except `Other` implies exactly one address type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EstabType {
    HallOfResidence,
    CareHome,
    Hospital,
    Hospice,
    MentalHealthHospital,
    MedicalCareOther,
    BoardingSchool,
    LowOrMediumSecureMentalHealth,
    HighSecureMentalHealth,
    Hotel,
    YouthHostel,
    Hostel,
    MilitarySla,
    MilitaryUsSla,
    ReligiousCommunity,
    ResidentialChildrensHome,
    EducationOther,
    Prison,
    ImmigrationRemovalCentre,
    ApprovedPremises,
    RoughSleeper,
    StaffAccommodation,
    Camphill,
    HolidayPark,
    Household,
    ShelteredAccommodation,
    ResidentialCaravan,
    ResidentialBoat,
    GatedApartments,
    ModHouseholds,
    ForeignOffices,
    Castles,
    GrtSite,
    MilitarySfa,
    Embassy,
    RoyalHousehold,
    CaravanSite,
    Marina,
    TravellingPersons,
    TransientPersons,
    Other,
}

const ESTAB_CODES: &[(EstabType, &str, Option<AddressType>)] = &[
    (EstabType::HallOfResidence, "HALL_OF_RESIDENCE", Some(AddressType::CE)),
    (EstabType::CareHome, "CARE_HOME", Some(AddressType::CE)),
    (EstabType::Hospital, "HOSPITAL", Some(AddressType::CE)),
    (EstabType::Hospice, "HOSPICE", Some(AddressType::CE)),
    (EstabType::MentalHealthHospital, "MENTAL_HEALTH_HOSPITAL", Some(AddressType::CE)),
    (EstabType::MedicalCareOther, "MEDICAL_CARE_OTHER", Some(AddressType::CE)),
    (EstabType::BoardingSchool, "BOARDING_SCHOOL", Some(AddressType::CE)),
    (
        EstabType::LowOrMediumSecureMentalHealth,
        "LOW_OR_MEDIUM_SECURE_MENTAL_HEALTH",
        Some(AddressType::CE),
    ),
    (EstabType::HighSecureMentalHealth, "HIGH_SECURE_MENTAL_HEALTH", Some(AddressType::CE)),
    (EstabType::Hotel, "HOTEL", Some(AddressType::CE)),
    (EstabType::YouthHostel, "YOUTH_HOSTEL", Some(AddressType::CE)),
    (EstabType::Hostel, "HOSTEL", Some(AddressType::CE)),
    (EstabType::MilitarySla, "MILITARY_SLA", Some(AddressType::CE)),
    (EstabType::MilitaryUsSla, "MILITARY_US_SLA", Some(AddressType::CE)),
    (EstabType::ReligiousCommunity, "RELIGIOUS_COMMUNITY", Some(AddressType::CE)),
    (EstabType::ResidentialChildrensHome, "RESIDENTIAL_CHILDRENS_HOME", Some(AddressType::CE)),
    (EstabType::EducationOther, "EDUCATION_OTHER", Some(AddressType::CE)),
    (EstabType::Prison, "PRISON", Some(AddressType::CE)),
    (EstabType::ImmigrationRemovalCentre, "IMMIGRATION_REMOVAL_CENTRE", Some(AddressType::CE)),
    (EstabType::ApprovedPremises, "APPROVED_PREMISES", Some(AddressType::CE)),
    (EstabType::RoughSleeper, "ROUGH_SLEEPER", Some(AddressType::CE)),
    (EstabType::StaffAccommodation, "STAFF_ACCOMMODATION", Some(AddressType::CE)),
    (EstabType::Camphill, "CAMPHILL", Some(AddressType::CE)),
    (EstabType::HolidayPark, "HOLIDAY_PARK", Some(AddressType::CE)),
    (EstabType::Household, "HOUSEHOLD", Some(AddressType::HH)),
    (EstabType::ShelteredAccommodation, "SHELTERED_ACCOMMODATION", Some(AddressType::HH)),
    (EstabType::ResidentialCaravan, "RESIDENTIAL_CARAVAN", Some(AddressType::SPG)),
    (EstabType::ResidentialBoat, "RESIDENTIAL_BOAT", Some(AddressType::SPG)),
    (EstabType::GatedApartments, "GATED_APARTMENTS", Some(AddressType::SPG)),
    (EstabType::ModHouseholds, "MOD_HOUSEHOLDS", Some(AddressType::SPG)),
    (EstabType::ForeignOffices, "FOREIGN_OFFICES", Some(AddressType::SPG)),
    (EstabType::Castles, "CASTLES", Some(AddressType::SPG)),
    (EstabType::GrtSite, "GRT_SITE", Some(AddressType::SPG)),
    (EstabType::MilitarySfa, "MILITARY_SFA", Some(AddressType::SPG)),
    (EstabType::Embassy, "EMBASSY", Some(AddressType::SPG)),
    (EstabType::RoyalHousehold, "ROYAL_HOUSEHOLD", Some(AddressType::SPG)),
    (EstabType::CaravanSite, "CARAVAN_SITE", Some(AddressType::SPG)),
    (EstabType::Marina, "MARINA", Some(AddressType::SPG)),
    (EstabType::TravellingPersons, "TRAVELLING_PERSONS", Some(AddressType::SPG)),
    (EstabType::TransientPersons, "TRANSIENT_PERSONS", Some(AddressType::SPG)),
    (EstabType::Other, "OTHER", None),
];

impl EstabType {
    /// Parse an estab type code. Spaces and hyphens are treated as
    /// underscores; anything unrecognised is `Other`.
    pub fn from_code(code: &str) -> Self {
        let normalized: String = code
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect();
        ESTAB_CODES
            .iter()
            .find(|(_, c, _)| *c == normalized)
            .map(|(estab, _, _)| *estab)
            .unwrap_or(EstabType::Other)
    }

    pub fn code(self) -> &'static str {
        self.entry().1
    }

    /// The address type this estab type implies, `None` for `Other`.
    pub fn address_type(self) -> Option<AddressType> {
        self.entry().2
    }

    fn entry(self) -> &'static (EstabType, &'static str, Option<AddressType>) {
        ESTAB_CODES
            .iter()
            .find(|(estab, _, _)| *estab == self)
            .unwrap_or(&ESTAB_CODES[ESTAB_CODES.len() - 1])
    }
}

impl fmt::Display for EstabType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl From<String> for EstabType {
    fn from(code: String) -> Self {
        EstabType::from_code(&code)
    }
}

impl From<EstabType> for String {
    fn from(estab: EstabType) -> Self {
        estab.code().to_string()
    }
}

/// Unique property reference number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct UniquePropertyReferenceNumber(u64);

impl UniquePropertyReferenceNumber {
    pub fn new(value: u64) -> Result<Self, String> {
        if value == 0 || value > MAX_UPRN {
            return Err(format!(
                "UPRN must be between 1 and {} (got: {})",
                MAX_UPRN, value
            ));
        }
        Ok(Self(value))
    }

    /// Parse the string form used on the wire.
    pub fn parse(value: &str) -> Result<Self, String> {
        let n: u64 = value
            .trim()
            .parse()
            .map_err(|_| format!("UPRN is not a number: '{}'", value))?;
        Self::new(n)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for UniquePropertyReferenceNumber {
    type Error = String;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UniquePropertyReferenceNumber> for u64 {
    fn from(uprn: UniquePropertyReferenceNumber) -> Self {
        uprn.0
    }
}

impl fmt::Display for UniquePropertyReferenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An event recorded against a case by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseEvent {
    pub id: String,
    pub category: String,
    pub description: String,
    pub created_date_time: Option<DateTime<Utc>>,
}

/// A case as returned to agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub id: Uuid,
    pub case_ref: Option<String>,
    pub case_type: CaseType,
    pub address_type: Option<AddressType>,
    pub address_level: Option<AddressLevel>,
    pub estab_type: EstabType,
    pub survey_type: String,
    pub region: String,
    pub address_line1: String,
    pub address_line2: String,
    pub address_line3: String,
    pub town_name: String,
    pub postcode: String,
    pub organisation_name: String,
    pub uprn: Option<UniquePropertyReferenceNumber>,
    pub estab_uprn: Option<UniquePropertyReferenceNumber>,
    pub ce_usual_residents: Option<u32>,
    pub secure_establishment: bool,
    pub created_date_time: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub allowed_delivery_channels: Vec<DeliveryChannel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_events: Option<Vec<CaseEvent>>,
}

impl Case {
    pub fn is_ccs(&self) -> bool {
        self.survey_type.eq_ignore_ascii_case(SURVEY_TYPE_CCS)
    }
}

/// A case created locally for an address the registry does not know yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedCase {
    pub id: Uuid,
    pub uprn: Option<UniquePropertyReferenceNumber>,
    pub case_type: CaseType,
    pub address_type: AddressType,
    pub estab_type: EstabType,
    pub region: String,
    pub address_line1: String,
    pub address_line2: String,
    pub address_line3: String,
    pub town_name: String,
    pub postcode: String,
    pub organisation_name: String,
    pub ce_usual_residents: Option<u32>,
    pub created_date_time: DateTime<Utc>,
    #[serde(default)]
    pub case_events: Vec<CaseEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estab_type_lookup() {
        assert_eq!(EstabType::from_code("CARE_HOME"), EstabType::CareHome);
        assert_eq!(EstabType::from_code("care home"), EstabType::CareHome);
        assert_eq!(EstabType::from_code("FOREIGN_OFFICES"), EstabType::ForeignOffices);
        assert_eq!(EstabType::from_code("a palace"), EstabType::Other);
        assert_eq!(EstabType::CareHome.address_type(), Some(AddressType::CE));
        assert_eq!(EstabType::ForeignOffices.address_type(), Some(AddressType::SPG));
        assert_eq!(EstabType::Household.address_type(), Some(AddressType::HH));
        assert_eq!(EstabType::Other.address_type(), None);
    }

    #[test]
    fn test_estab_type_serde_uses_codes() {
        let json = serde_json::to_string(&EstabType::MilitarySla).unwrap();
        assert_eq!(json, "\"MILITARY_SLA\"");
        let parsed: EstabType = serde_json::from_str("\"Hall of residence\"").unwrap();
        assert_eq!(parsed, EstabType::HallOfResidence);
    }

    #[test]
    fn test_unknown_case_type_deserializes() {
        let parsed: CaseType = serde_json::from_str("\"NR\"").unwrap();
        assert_eq!(parsed, CaseType::Unknown);
        assert!(!parsed.is_agent_visible());
    }

    #[test]
    fn test_region_from_code() {
        assert_eq!(Region::from_region_code("E1234"), Some(Region::E));
        assert_eq!(Region::from_region_code("w0001"), Some(Region::W));
        assert_eq!(Region::from_region_code("N"), Some(Region::N));
        assert_eq!(Region::from_region_code("S1234"), None);
        assert_eq!(Region::from_region_code(""), None);
    }

    #[test]
    fn test_uprn_bounds() {
        assert!(UniquePropertyReferenceNumber::new(0).is_err());
        assert!(UniquePropertyReferenceNumber::new(MAX_UPRN).is_ok());
        assert!(UniquePropertyReferenceNumber::new(MAX_UPRN + 1).is_err());
        assert_eq!(
            UniquePropertyReferenceNumber::parse("1347459999").unwrap().value(),
            1347459999
        );
        assert!(UniquePropertyReferenceNumber::parse("12ab").is_err());
        assert!(serde_json::from_str::<UniquePropertyReferenceNumber>("0").is_err());
    }

    #[test]
    fn test_address_level_for_address_type() {
        assert_eq!(AddressType::CE.address_level(), AddressLevel::E);
        assert_eq!(AddressType::HH.address_level(), AddressLevel::U);
        assert_eq!(AddressType::SPG.address_level(), AddressLevel::U);
    }
}
