//! In-memory collaborator mocks for testing.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AddressLookup, CaseRegistry, HttpClientError, LaunchTokenEncoder, Result};
use crate::model::{
    AddressRecord, LaunchData, QuestionnaireId, RegistryCase, UniquePropertyReferenceNumber,
};

fn failure(status: u16) -> HttpClientError {
    if status == 404 {
        HttpClientError::NotFound("Mock not found".to_string())
    } else {
        HttpClientError::Status {
            status,
            body: "Mock failure".to_string(),
        }
    }
}

/// A questionnaire id request seen by [`MockCaseRegistry`].
#[derive(Debug, Clone, PartialEq)]
pub struct QidRequest {
    pub case_id: Uuid,
    pub individual: bool,
    pub individual_case_id: Option<Uuid>,
}

/// Mock case registry for testing.
#[derive(Default)]
pub struct MockCaseRegistry {
    cases: RwLock<Vec<RegistryCase>>,
    fail_status: RwLock<Option<u16>>,
    qid_requests: RwLock<Vec<QidRequest>>,
    calls: RwLock<usize>,
}

impl MockCaseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, case: RegistryCase) {
        self.cases.write().await.push(case);
    }

    /// Answer every call with this status until cleared.
    pub async fn set_fail_status(&self, status: Option<u16>) {
        *self.fail_status.write().await = status;
    }

    /// Registry calls made so far.
    pub async fn call_count(&self) -> usize {
        *self.calls.read().await
    }

    pub async fn qid_requests(&self) -> Vec<QidRequest> {
        self.qid_requests.read().await.clone()
    }

    async fn begin_call(&self) -> Result<()> {
        *self.calls.write().await += 1;
        match *self.fail_status.read().await {
            Some(status) => Err(failure(status)),
            None => Ok(()),
        }
    }

    fn shape(mut case: RegistryCase, include_events: bool) -> RegistryCase {
        if !include_events {
            case.case_events.clear();
        }
        case
    }
}

#[async_trait]
impl CaseRegistry for MockCaseRegistry {
    async fn get_case_by_id(&self, id: Uuid, include_events: bool) -> Result<RegistryCase> {
        self.begin_call().await?;
        self.cases
            .read()
            .await
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .map(|c| Self::shape(c, include_events))
            .ok_or_else(|| HttpClientError::NotFound(format!("Case Id Not Found: {}", id)))
    }

    async fn get_cases_by_uprn(
        &self,
        uprn: UniquePropertyReferenceNumber,
        include_events: bool,
    ) -> Result<Vec<RegistryCase>> {
        self.begin_call().await?;
        let wanted = uprn.to_string();
        let found: Vec<RegistryCase> = self
            .cases
            .read()
            .await
            .iter()
            .filter(|c| c.uprn.as_deref() == Some(wanted.as_str()))
            .cloned()
            .map(|c| Self::shape(c, include_events))
            .collect();
        if found.is_empty() {
            return Err(HttpClientError::NotFound(format!(
                "Case UPRN Not Found: {}",
                uprn
            )));
        }
        Ok(found)
    }

    async fn get_case_by_case_ref(
        &self,
        case_ref: u64,
        include_events: bool,
    ) -> Result<RegistryCase> {
        self.begin_call().await?;
        let wanted = case_ref.to_string();
        self.cases
            .read()
            .await
            .iter()
            .find(|c| c.case_ref.as_deref() == Some(wanted.as_str()))
            .cloned()
            .map(|c| Self::shape(c, include_events))
            .ok_or_else(|| HttpClientError::NotFound(format!("Case Ref Not Found: {}", case_ref)))
    }

    async fn request_questionnaire_id(
        &self,
        case_id: Uuid,
        individual: bool,
        individual_case_id: Option<Uuid>,
    ) -> Result<QuestionnaireId> {
        self.begin_call().await?;
        let mut requests = self.qid_requests.write().await;
        requests.push(QidRequest {
            case_id,
            individual,
            individual_case_id,
        });

        let case_type = self
            .cases
            .read()
            .await
            .iter()
            .find(|c| c.id == case_id)
            .map(|c| c.case_type.clone())
            .unwrap_or_default();
        let form_type = match (individual, case_type.as_str()) {
            (true, _) => "I",
            (false, "CE") => "C",
            _ => "H",
        };
        Ok(QuestionnaireId {
            questionnaire_id: format!("{:013}", 1_100_000_000 + requests.len()),
            uac: format!("UAC{:013}", requests.len()),
            form_type: form_type.to_string(),
        })
    }
}

/// Mock address index for testing.
#[derive(Default)]
pub struct MockAddressLookup {
    addresses: RwLock<HashMap<UniquePropertyReferenceNumber, AddressRecord>>,
    fail_status: RwLock<Option<u16>>,
    calls: RwLock<usize>,
}

impl MockAddressLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, uprn: UniquePropertyReferenceNumber, address: AddressRecord) {
        self.addresses.write().await.insert(uprn, address);
    }

    pub async fn set_fail_status(&self, status: Option<u16>) {
        *self.fail_status.write().await = status;
    }

    pub async fn call_count(&self) -> usize {
        *self.calls.read().await
    }
}

#[async_trait]
impl AddressLookup for MockAddressLookup {
    async fn query_by_uprn(&self, uprn: UniquePropertyReferenceNumber) -> Result<AddressRecord> {
        *self.calls.write().await += 1;
        if let Some(status) = *self.fail_status.read().await {
            return Err(failure(status));
        }
        self.addresses
            .read()
            .await
            .get(&uprn)
            .cloned()
            .ok_or_else(|| HttpClientError::NotFound(format!("UPRN Not Found: {}", uprn)))
    }
}

/// Mock launch token encoder for testing.
///
/// Tokens are `token-{questionnaire_id}`.
#[derive(Default)]
pub struct MockLaunchTokenEncoder {
    encoded: RwLock<Vec<LaunchData>>,
    fail_status: RwLock<Option<u16>>,
}

impl MockLaunchTokenEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_fail_status(&self, status: Option<u16>) {
        *self.fail_status.write().await = status;
    }

    pub async fn take_encoded(&self) -> Vec<LaunchData> {
        std::mem::take(&mut *self.encoded.write().await)
    }
}

#[async_trait]
impl LaunchTokenEncoder for MockLaunchTokenEncoder {
    async fn encode(&self, data: &LaunchData) -> Result<String> {
        if let Some(status) = *self.fail_status.read().await {
            return Err(failure(status));
        }
        self.encoded.write().await.push(data.clone());
        Ok(format!("token-{}", data.questionnaire_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_case(uprn: &str, case_ref: &str) -> RegistryCase {
        RegistryCase {
            id: Uuid::new_v4(),
            case_ref: Some(case_ref.to_string()),
            case_type: "HH".to_string(),
            uprn: Some(uprn.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_registry_lookups() {
        let registry = MockCaseRegistry::new();
        let case = registry_case("100041045018", "1000000008");
        registry.insert(case.clone()).await;

        assert_eq!(registry.get_case_by_id(case.id, false).await.unwrap().id, case.id);
        assert_eq!(
            registry.get_case_by_case_ref(1000000008, false).await.unwrap().id,
            case.id
        );
        let uprn = UniquePropertyReferenceNumber::new(100041045018).unwrap();
        assert_eq!(registry.get_cases_by_uprn(uprn, false).await.unwrap().len(), 1);
        assert_eq!(registry.call_count().await, 3);
    }

    #[tokio::test]
    async fn test_registry_miss_is_not_found() {
        let registry = MockCaseRegistry::new();
        let err = registry.get_case_by_id(Uuid::new_v4(), false).await.unwrap_err();
        assert!(err.is_not_found());

        let uprn = UniquePropertyReferenceNumber::new(7).unwrap();
        assert!(registry.get_cases_by_uprn(uprn, false).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_registry_fail_status() {
        let registry = MockCaseRegistry::new();
        registry.set_fail_status(Some(500)).await;
        let err = registry.get_case_by_id(Uuid::new_v4(), false).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_qid_form_type() {
        let registry = MockCaseRegistry::new();
        let mut ce = registry_case("1", "18");
        ce.case_type = "CE".to_string();
        registry.insert(ce.clone()).await;

        let qid = registry.request_questionnaire_id(ce.id, false, None).await.unwrap();
        assert_eq!(qid.form_type, "C");
        let qid = registry.request_questionnaire_id(ce.id, true, None).await.unwrap();
        assert_eq!(qid.form_type, "I");
        assert_eq!(registry.qid_requests().await.len(), 2);
    }
}
