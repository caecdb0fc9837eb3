//! Fulfilment product reference data.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::case::{CaseType, Region};

/// How a fulfilment reaches the respondent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeliveryChannel {
    Post,
    Sms,
}

impl DeliveryChannel {
    /// Channels every case is offered.
    pub const ALL: [DeliveryChannel; 2] = [DeliveryChannel::Post, DeliveryChannel::Sms];
}

impl fmt::Display for DeliveryChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryChannel::Post => f.write_str("POST"),
            DeliveryChannel::Sms => f.write_str("SMS"),
        }
    }
}

/// Channel a fulfilment request arrives through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestChannel {
    /// Contact centre.
    Cc,
    /// Respondent home (web).
    Rh,
    Field,
}

/// A fulfilment product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub fulfilment_code: String,
    pub description: String,
    #[serde(default)]
    pub language: Option<String>,
    pub case_types: Vec<CaseType>,
    pub regions: Vec<Region>,
    pub delivery_channel: DeliveryChannel,
    pub request_channels: Vec<RequestChannel>,
    #[serde(default)]
    pub individual: bool,
    #[serde(default)]
    pub hand_delivery_only: bool,
}

impl Product {
    /// Targets a named person rather than the household or establishment.
    pub fn targets_individual(&self) -> bool {
        self.individual
    }

    /// Targets an individual within a household, who gets their own case id.
    pub fn is_household_individual(&self) -> bool {
        self.individual && self.case_types.contains(&CaseType::HH)
    }
}

/// Search criteria for the product catalogue. `None` matches anything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductCriteria {
    pub fulfilment_code: Option<String>,
    pub request_channel: Option<RequestChannel>,
    pub delivery_channel: Option<DeliveryChannel>,
    pub region: Option<Region>,
    pub case_type: Option<CaseType>,
    pub individual: Option<bool>,
}

impl ProductCriteria {
    pub fn matches(&self, product: &Product) -> bool {
        self.fulfilment_code
            .as_deref()
            .is_none_or(|code| product.fulfilment_code == code)
            && self
                .request_channel
                .is_none_or(|c| product.request_channels.contains(&c))
            && self
                .delivery_channel
                .is_none_or(|c| product.delivery_channel == c)
            && self.region.is_none_or(|r| product.regions.contains(&r))
            && self
                .case_type
                .is_none_or(|t| product.case_types.contains(&t))
            && self.individual.is_none_or(|i| product.individual == i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        Product {
            fulfilment_code: "P_OR_I1".to_string(),
            description: "Individual paper questionnaire".to_string(),
            language: Some("eng".to_string()),
            case_types: vec![CaseType::HH, CaseType::SPG, CaseType::CE],
            regions: vec![Region::E],
            delivery_channel: DeliveryChannel::Post,
            request_channels: vec![RequestChannel::Cc, RequestChannel::Rh],
            individual: true,
            hand_delivery_only: false,
        }
    }

    #[test]
    fn test_empty_criteria_matches_everything() {
        assert!(ProductCriteria::default().matches(&product()));
    }

    #[test]
    fn test_criteria_filters_each_dimension() {
        let p = product();
        let base = ProductCriteria {
            fulfilment_code: Some("P_OR_I1".to_string()),
            request_channel: Some(RequestChannel::Cc),
            delivery_channel: Some(DeliveryChannel::Post),
            region: Some(Region::E),
            ..Default::default()
        };
        assert!(base.matches(&p));
        assert!(!ProductCriteria {
            region: Some(Region::W),
            ..base.clone()
        }
        .matches(&p));
        assert!(!ProductCriteria {
            delivery_channel: Some(DeliveryChannel::Sms),
            ..base.clone()
        }
        .matches(&p));
        assert!(!ProductCriteria {
            request_channel: Some(RequestChannel::Field),
            ..base.clone()
        }
        .matches(&p));
        assert!(!ProductCriteria {
            fulfilment_code: Some("P_OR_H1".to_string()),
            ..base
        }
        .matches(&p));
    }

    #[test]
    fn test_household_individual() {
        let mut p = product();
        assert!(p.is_household_individual());
        p.case_types = vec![CaseType::CE];
        assert!(p.targets_individual());
        assert!(!p.is_household_individual());
    }
}
