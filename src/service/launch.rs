//! Questionnaire launch and UAC requests.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::{CaseService, LAUNCH_ENCODER, REGISTRY};
use crate::error::{CaseError, Result};
use crate::model::events::SurveyLaunchedResponse;
use crate::model::{
    Case, CaseType, EventPayload, LaunchData, LaunchRequest, QuestionnaireId, UacRequest,
    UacResponse,
};
use crate::validation::check_launch_eligibility;

const LAUNCH_LANGUAGE: &str = "en";
const LAUNCH_SOURCE: &str = "CONTACT_CENTRE_API";
const LAUNCH_CHANNEL: &str = "CC";

impl CaseService {
    /// Build the questionnaire URL an agent opens to capture a response by
    /// telephone.
    pub async fn get_launch_url_for_case_id(
        &self,
        case_id: Uuid,
        request: LaunchRequest,
    ) -> Result<String> {
        info!(%case_id, agent_id = %request.agent_id, individual = request.individual, "Launch request");
        let case = self.resolve_case(case_id, false).await?.case;
        check_launch_eligibility(&case, request.individual)?;

        let individual_case_id = individual_case_id(&case, request.individual);
        let qid = self
            .allocate_questionnaire(&case, request.individual, individual_case_id)
            .await?;

        let data = LaunchData {
            language: LAUNCH_LANGUAGE.to_string(),
            source: LAUNCH_SOURCE.to_string(),
            channel: LAUNCH_CHANNEL.to_string(),
            user_id: request.agent_id.clone(),
            questionnaire_id: qid.questionnaire_id.clone(),
            form_type: qid.form_type.clone(),
            individual_case_id,
            case_details: case.clone(),
        };
        let token = self
            .encoder
            .encode(&data)
            .await
            .map_err(|e| CaseError::upstream(LAUNCH_ENCODER, e))?;
        let url = self.launch.launch_url(&token);

        self.emit(EventPayload::SurveyLaunched(SurveyLaunchedResponse {
            questionnaire_id: qid.questionnaire_id,
            case_id: individual_case_id.unwrap_or(case.id),
            agent_id: request.agent_id,
        }))
        .await?;
        Ok(url)
    }

    /// Allocate a questionnaire id and UAC without launching. Nothing is
    /// published.
    pub async fn get_uac_for_case_id(
        &self,
        case_id: Uuid,
        request: UacRequest,
    ) -> Result<UacResponse> {
        info!(%case_id, agent_id = %request.agent_id, individual = request.individual, "UAC request");
        let case = self.resolve_case(case_id, false).await?.case;
        check_launch_eligibility(&case, request.individual)?;

        let individual_case_id = individual_case_id(&case, request.individual);
        let qid = self
            .allocate_questionnaire(&case, request.individual, individual_case_id)
            .await?;

        Ok(UacResponse {
            id: case.id,
            uac: qid.uac,
            questionnaire_id: qid.questionnaire_id,
            form_type: qid.form_type,
            date_time: Utc::now(),
        })
    }

    async fn allocate_questionnaire(
        &self,
        case: &Case,
        individual: bool,
        individual_case_id: Option<Uuid>,
    ) -> Result<QuestionnaireId> {
        self.registry
            .request_questionnaire_id(case.id, individual, individual_case_id)
            .await
            .map_err(|e| CaseError::upstream(REGISTRY, e))
    }
}

/// Individuals in a household get a case of their own.
fn individual_case_id(case: &Case, individual: bool) -> Option<Uuid> {
    (individual && case.case_type == CaseType::HH).then(Uuid::new_v4)
}
