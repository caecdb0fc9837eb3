//! Case registry client.

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use super::{HttpClient, Result};
use crate::config::RegistryConfig;
use crate::model::{QuestionnaireId, RegistryCase, UniquePropertyReferenceNumber};

/// The case-management service, system of record for cases.
#[async_trait]
pub trait CaseRegistry: Send + Sync {
    async fn get_case_by_id(&self, id: Uuid, include_events: bool) -> Result<RegistryCase>;

    /// All cases at the address. A registry with no case there answers
    /// not-found rather than an empty list.
    async fn get_cases_by_uprn(
        &self,
        uprn: UniquePropertyReferenceNumber,
        include_events: bool,
    ) -> Result<Vec<RegistryCase>>;

    async fn get_case_by_case_ref(&self, case_ref: u64, include_events: bool)
        -> Result<RegistryCase>;

    /// Allocate a questionnaire id and UAC for a case.
    async fn request_questionnaire_id(
        &self,
        case_id: Uuid,
        individual: bool,
        individual_case_id: Option<Uuid>,
    ) -> Result<QuestionnaireId>;
}

/// reqwest implementation of [`CaseRegistry`].
pub struct HttpCaseRegistry {
    http: HttpClient,
}

impl HttpCaseRegistry {
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new("case registry", &config.base_url, config.timeout())?,
        })
    }
}

#[async_trait]
impl CaseRegistry for HttpCaseRegistry {
    async fn get_case_by_id(&self, id: Uuid, include_events: bool) -> Result<RegistryCase> {
        debug!(case_id = %id, "Registry lookup by id");
        self.http
            .get_json(
                &format!("/cases/{}", id),
                &[("caseEvents", include_events.to_string())],
            )
            .await
    }

    async fn get_cases_by_uprn(
        &self,
        uprn: UniquePropertyReferenceNumber,
        include_events: bool,
    ) -> Result<Vec<RegistryCase>> {
        debug!(uprn = %uprn, "Registry lookup by UPRN");
        self.http
            .get_json(
                &format!("/cases/uprn/{}", uprn),
                &[
                    ("validAddressOnly", "true".to_string()),
                    ("caseEvents", include_events.to_string()),
                ],
            )
            .await
    }

    async fn get_case_by_case_ref(
        &self,
        case_ref: u64,
        include_events: bool,
    ) -> Result<RegistryCase> {
        debug!(case_ref, "Registry lookup by case reference");
        self.http
            .get_json(
                &format!("/cases/ref/{}", case_ref),
                &[("caseEvents", include_events.to_string())],
            )
            .await
    }

    async fn request_questionnaire_id(
        &self,
        case_id: Uuid,
        individual: bool,
        individual_case_id: Option<Uuid>,
    ) -> Result<QuestionnaireId> {
        let mut query = vec![("individual", individual.to_string())];
        if let Some(individual_case_id) = individual_case_id {
            query.push(("individualCaseId", individual_case_id.to_string()));
        }
        self.http
            .get_json(&format!("/cases/{}/qid", case_id), &query)
            .await
    }
}
