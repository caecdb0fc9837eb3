//! Refusal reporting.

use tracing::info;
use uuid::Uuid;

use super::CaseService;
use crate::error::Result;
use crate::model::events::{CollectionCaseCompact, Contact, RefusalDetails};
use crate::model::mapping::address_from_refusal;
use crate::model::{EventPayload, RefusalRequest, ResponseDto};

/// Response id when the refusal is not tied to a known case.
pub const UNKNOWN_CASE_ID: &str = "unknown";

impl CaseService {
    /// Record a refusal. The case need not exist in the registry, and an
    /// absent case id is reported against the nil UUID.
    pub async fn report_refusal(
        &self,
        case_id: Option<Uuid>,
        request: RefusalRequest,
    ) -> Result<ResponseDto> {
        info!(
            case_id = ?case_id,
            agent_id = %request.agent_id,
            reason = %request.reason,
            "Report refusal"
        );
        let address = address_from_refusal(&request);
        let RefusalRequest {
            agent_id,
            call_id,
            reason,
            is_householder,
            title,
            forename,
            surname,
            telephone_number,
            notes,
            ..
        } = request;

        self.emit(EventPayload::Refusal(RefusalDetails {
            refusal_type: format!("{}_REFUSAL", reason),
            report: notes,
            agent_id,
            call_id,
            is_householder,
            collection_case: CollectionCaseCompact {
                id: case_id.unwrap_or(Uuid::nil()),
            },
            contact: Contact {
                title,
                forename,
                surname,
                tel_no: telephone_number,
            },
            address,
        }))
        .await?;

        let id = case_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| UNKNOWN_CASE_ID.to_string());
        Ok(ResponseDto::now(id))
    }
}
