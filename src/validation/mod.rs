//! Business-rule checks for agent requests.
//!
//! Everything here is a pure function over the request and the resolved
//! case, so the rules are checked before any collaborator call where the
//! inputs allow it.

use crate::error::{CaseError, Result};
use crate::model::{AddressLevel, AddressType, Case, CaseType, EstabType, Product, Region};

/// Error constants for validation failures.
pub mod errmsg {
    pub const INVALID_CASE_REF: &str = "Invalid Case Reference";
    pub const CASE_NOT_SUITABLE: &str = "Case is not suitable";
    pub const NO_COMPATIBLE_PRODUCT: &str = "Compatible product cannot be found";
    pub const POSTAL_NOT_DELIVERABLE: &str =
        "Postal fulfilments cannot be delivered to this respondent";
    pub const LAUNCH_CASE_TYPE: &str = "must be SPG, CE or HH";
    pub const CE_MANAGER_UNIT: &str =
        "A CE Manager form can only be launched against an establishment address not a UNIT.";
    pub const CE_MANAGER_NI: &str =
        "All Northern Ireland calls from CE Managers are to be escalated to the NI management team.";
    pub const CCS_CE_LAUNCH: &str = "Telephone capture feature is not available for CCS \
        Communal establishment's. CCS CE's must submit their survey via CCS Paper Questionnaire";
    pub const CE_RESIDENTS: &str =
        "Number of usual residents must be greater than 0 for a CE case";
    pub const CE_INVALIDATE: &str = "All CE addresses will be validated by a Field Officer. \
        It is not necessary to submit this Invalidation request.";
    pub const INDIVIDUAL_CONTACT: &str =
        "The fulfilment is for an individual so the following fields cannot be empty";
}

/// Check a case reference with the mod-10 (Luhn) checksum.
///
/// Starting from the rightmost digit, every second digit is doubled and
/// has 9 subtracted when the result exceeds 9; the digit sum must be a
/// multiple of 10.
pub fn luhn_valid(reference: u64) -> bool {
    let mut remaining = reference;
    let mut sum = 0u64;
    let mut double = false;
    loop {
        let mut digit = remaining % 10;
        if double {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
        double = !double;
        remaining /= 10;
        if remaining == 0 {
            break;
        }
    }
    sum % 10 == 0
}

/// Case references are positive and carry a Luhn check digit. Zero passes
/// the checksum but is never issued.
pub fn validate_case_ref(reference: u64) -> Result<()> {
    if reference == 0 || !luhn_valid(reference) {
        return Err(CaseError::invalid(errmsg::INVALID_CASE_REF));
    }
    Ok(())
}

/// Derive the address type of a case: the estab type decides, unless it is
/// `OTHER`, in which case the case type's own address type applies.
pub fn derive_address_type(estab_type: EstabType, case_type: CaseType) -> Option<AddressType> {
    estab_type
        .address_type()
        .or_else(|| case_type.natural_address_type())
}

/// Reject a case type that does not sit on the address type the estab type
/// implies. `OTHER` accepts any case type.
pub fn validate_compatible_estab_and_case_type(
    case_type: CaseType,
    estab_type: EstabType,
) -> Result<()> {
    if let Some(address_type) = estab_type.address_type() {
        if address_type.case_type() != case_type {
            return Err(CaseError::invalid(format!(
                "Derived address type of '{}', from establishment type '{}', \
                 is not compatible with caseType of '{}'",
                address_type, estab_type, case_type
            )));
        }
    }
    Ok(())
}

/// A CE must declare a strictly positive number of usual residents.
pub fn validate_ce_residents(case_type: CaseType, usual_residents: Option<u32>) -> Result<()> {
    if case_type == CaseType::CE && usual_residents.unwrap_or(0) == 0 {
        return Err(CaseError::invalid(errmsg::CE_RESIDENTS));
    }
    Ok(())
}

/// Registry cases shown to an agent must be households or CEs.
pub fn validate_agent_visible(case: &Case) -> Result<()> {
    if !case.case_type.is_agent_visible() {
        return Err(CaseError::forbidden(errmsg::CASE_NOT_SUITABLE));
    }
    Ok(())
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// Require that a string field is present and not blank.
pub fn require_not_blank(value: Option<&str>, field_name: &str) -> Result<()> {
    if is_blank(value) {
        return Err(CaseError::invalid(format!(
            "{} must not be empty",
            field_name
        )));
    }
    Ok(())
}

/// A postal fulfilment for an individual must name the person.
pub fn validate_postal_contact(
    product: &Product,
    title: Option<&str>,
    forename: Option<&str>,
    surname: Option<&str>,
) -> Result<()> {
    if !product.targets_individual() {
        return Ok(());
    }
    let missing: Vec<String> = [("title", title), ("forename", forename), ("surname", surname)]
        .into_iter()
        .filter(|(_, value)| is_blank(*value))
        .map(|(name, _)| format!("'{}'", name))
        .collect();
    if !missing.is_empty() {
        return Err(CaseError::invalid(format!(
            "{}: {}",
            errmsg::INDIVIDUAL_CONTACT,
            missing.join(", ")
        )));
    }
    Ok(())
}

pub fn validate_sms_contact(telephone_number: &str) -> Result<()> {
    require_not_blank(Some(telephone_number), "telephoneNumber")
}

/// Products flagged for hand delivery cannot go by post.
pub fn validate_deliverable(product: &Product, postal: bool) -> Result<()> {
    if postal && product.hand_delivery_only {
        return Err(CaseError::invalid(errmsg::POSTAL_NOT_DELIVERABLE));
    }
    Ok(())
}

/// Gate for questionnaire launches and UAC requests.
///
/// Rules are evaluated in order and the first failure wins:
/// 1. case type must be HH, CE or SPG
/// 2. a CE manager form needs an establishment-level address
/// 3. CE manager calls from Northern Ireland are escalated
/// 4. CCS CEs cannot use telephone capture
pub fn check_launch_eligibility(case: &Case, individual: bool) -> Result<()> {
    let case_type = case.case_type;
    if !matches!(case_type, CaseType::HH | CaseType::CE | CaseType::SPG) {
        return Err(CaseError::invalid(format!(
            "Case type '{}' {}",
            case_type,
            errmsg::LAUNCH_CASE_TYPE
        )));
    }
    if case_type == CaseType::CE && !individual {
        if address_level_of(case) == Some(AddressLevel::U) {
            return Err(CaseError::invalid(errmsg::CE_MANAGER_UNIT));
        }
        if Region::from_region_code(&case.region) == Some(Region::N) {
            return Err(CaseError::invalid(errmsg::CE_MANAGER_NI));
        }
    }
    if case.is_ccs() && case_type == CaseType::CE {
        return Err(CaseError::not_found(errmsg::CCS_CE_LAUNCH));
    }
    Ok(())
}

fn address_level_of(case: &Case) -> Option<AddressLevel> {
    case.address_level
        .or_else(|| case.address_type.map(AddressType::address_level))
}

/// CE addresses are validated in the field, never by an agent.
pub fn validate_invalidation(case: &Case) -> Result<()> {
    if case.case_type == CaseType::CE {
        return Err(CaseError::invalid(errmsg::CE_INVALIDATE));
    }
    Ok(())
}
