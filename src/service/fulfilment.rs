//! Postal and SMS fulfilment requests.

use tracing::{debug, info};
use uuid::Uuid;

use super::CaseService;
use crate::error::{CaseError, Result};
use crate::model::events::{Contact, FulfilmentRequest};
use crate::model::mapping::address_from_case;
use crate::model::{
    Case, DeliveryChannel, EventPayload, PostalFulfilmentRequest, Product, ProductCriteria, Region,
    RequestChannel, ResponseDto, SmsFulfilmentRequest,
};
use crate::validation::{errmsg, validate_deliverable, validate_postal_contact, validate_sms_contact};

impl CaseService {
    pub async fn fulfilment_request_by_post(
        &self,
        request: PostalFulfilmentRequest,
    ) -> Result<ResponseDto> {
        info!(
            case_id = %request.case_id,
            fulfilment_code = %request.fulfilment_code,
            "Postal fulfilment request"
        );
        let case = self.resolve_case(request.case_id, false).await?.case;
        let product = self.find_product(&case, &request.fulfilment_code, DeliveryChannel::Post)?;

        validate_deliverable(&product, true)?;
        validate_postal_contact(
            &product,
            request.title.as_deref(),
            request.forename.as_deref(),
            request.surname.as_deref(),
        )?;

        let contact = Contact {
            title: request.title,
            forename: request.forename,
            surname: request.surname,
            tel_no: None,
        };
        self.send_fulfilment(&case, &product, contact).await
    }

    pub async fn fulfilment_request_by_sms(
        &self,
        request: SmsFulfilmentRequest,
    ) -> Result<ResponseDto> {
        info!(
            case_id = %request.case_id,
            fulfilment_code = %request.fulfilment_code,
            "SMS fulfilment request"
        );
        let case = self.resolve_case(request.case_id, false).await?.case;
        let product = self.find_product(&case, &request.fulfilment_code, DeliveryChannel::Sms)?;

        validate_deliverable(&product, false)?;
        validate_sms_contact(&request.telephone_number)?;

        let contact = Contact {
            tel_no: Some(request.telephone_number),
            ..Contact::default()
        };
        self.send_fulfilment(&case, &product, contact).await
    }

    /// First contact-centre product for the code, channel and the case's
    /// region.
    fn find_product(
        &self,
        case: &Case,
        fulfilment_code: &str,
        delivery_channel: DeliveryChannel,
    ) -> Result<Product> {
        let region = Region::from_region_code(&case.region).ok_or_else(|| {
            CaseError::invalid(format!("Case region '{}' is not recognised", case.region))
        })?;
        let criteria = ProductCriteria {
            fulfilment_code: Some(fulfilment_code.to_string()),
            request_channel: Some(RequestChannel::Cc),
            delivery_channel: Some(delivery_channel),
            region: Some(region),
            ..Default::default()
        };
        self.products
            .search(&criteria)
            .into_iter()
            .next()
            .ok_or_else(|| CaseError::invalid(errmsg::NO_COMPATIBLE_PRODUCT))
    }

    async fn send_fulfilment(
        &self,
        case: &Case,
        product: &Product,
        contact: Contact,
    ) -> Result<ResponseDto> {
        let individual_case_id = product.is_household_individual().then(Uuid::new_v4);
        if let Some(individual_case_id) = individual_case_id {
            debug!(case_id = %case.id, %individual_case_id, "Minted individual case id");
        }

        self.emit(EventPayload::FulfilmentRequest(FulfilmentRequest {
            fulfilment_code: product.fulfilment_code.clone(),
            case_id: case.id,
            individual_case_id,
            contact,
            address: address_from_case(case),
        }))
        .await?;
        Ok(ResponseDto::now(case.id.to_string()))
    }
}
