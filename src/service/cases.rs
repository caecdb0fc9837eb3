//! Case lookup and address maintenance operations.

use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::{CaseService, CaseSource, ADDRESS_INDEX, REGISTRY};
use crate::error::{CaseError, Result};
use crate::model::case::SURVEY_TYPE_CENSUS;
use crate::model::events::{
    AddressModification, AddressNotValid, CollectionCaseCompact, NewAddress, NewAddressCase,
};
use crate::model::mapping::{
    address_compact_from_case, address_compact_from_modify, address_from_cached,
    cached_case_from_address, cached_case_from_request, case_from_cached, case_from_registry,
};
use crate::model::{
    CachedCase, Case, CaseType, EventPayload, InvalidateCaseRequest, ModifyCaseRequest,
    NewCaseRequest, ResponseDto, UniquePropertyReferenceNumber,
};
use crate::validation::{
    derive_address_type, validate_agent_visible, validate_case_ref, validate_ce_residents,
    validate_compatible_estab_and_case_type, validate_invalidation,
};

impl CaseService {
    /// Look up a case by id, falling back to locally created cases.
    pub async fn get_case_by_id(&self, id: Uuid, include_events: bool) -> Result<Case> {
        info!(case_id = %id, include_events, "Get case by id");
        let resolved = self.resolve_case(id, include_events).await?;
        if resolved.source == CaseSource::Registry {
            validate_agent_visible(&resolved.case)?;
        }
        Ok(resolved.case)
    }

    /// Look up a case by its reference. The reference is checksummed before
    /// the registry is called.
    pub async fn get_case_by_case_ref(&self, case_ref: u64, include_events: bool) -> Result<Case> {
        info!(case_ref, include_events, "Get case by reference");
        validate_case_ref(case_ref)?;

        let registry_case = self
            .registry
            .get_case_by_case_ref(case_ref, include_events)
            .await
            .map_err(|e| CaseError::upstream(REGISTRY, e))?;
        let case = case_from_registry(registry_case, include_events, &self.event_whitelist);
        validate_agent_visible(&case)?;
        Ok(case)
    }

    /// All agent-visible cases at an address.
    ///
    /// When neither the registry nor the cache knows the UPRN, the address
    /// index is queried and a new case is created for the address.
    pub async fn get_case_by_uprn(
        &self,
        uprn: UniquePropertyReferenceNumber,
        include_events: bool,
    ) -> Result<Vec<Case>> {
        info!(uprn = %uprn, include_events, "Get cases by UPRN");

        match self.registry.get_cases_by_uprn(uprn, include_events).await {
            Ok(registry_cases) => {
                let cases: Vec<Case> = registry_cases
                    .into_iter()
                    .map(|c| case_from_registry(c, include_events, &self.event_whitelist))
                    .filter(|c| c.case_type.is_agent_visible())
                    .collect();
                debug!(uprn = %uprn, count = cases.len(), "Registry cases at UPRN");
                Ok(cases)
            }
            Err(err) if err.is_not_found() => {
                if let Some(cached) = self.cache.read_by_uprn(uprn).await? {
                    debug!(uprn = %uprn, case_id = %cached.id, "Using cached case");
                    return Ok(vec![case_from_cached(&cached, include_events)]);
                }
                let cached = self.create_case_from_address_index(uprn).await?;
                Ok(vec![case_from_cached(&cached, include_events)])
            }
            Err(err) => Err(CaseError::upstream(REGISTRY, err)),
        }
    }

    async fn create_case_from_address_index(
        &self,
        uprn: UniquePropertyReferenceNumber,
    ) -> Result<CachedCase> {
        let record = self
            .address_lookup
            .query_by_uprn(uprn)
            .await
            .map_err(|e| CaseError::upstream(ADDRESS_INDEX, e))?;
        let cached = cached_case_from_address(&record, uprn, Uuid::new_v4(), Utc::now())
            .map_err(CaseError::invalid)?;

        info!(uprn = %uprn, case_id = %cached.id, "Creating case from address index");
        self.store_new_case(cached).await
    }

    /// Record a case for an address the registry does not know yet.
    pub async fn create_case_for_new_address(&self, request: NewCaseRequest) -> Result<Case> {
        if !matches!(
            request.case_type,
            CaseType::HH | CaseType::CE | CaseType::SPG
        ) {
            return Err(CaseError::invalid(format!(
                "Case type '{}' cannot be used for a new address",
                request.case_type
            )));
        }
        validate_compatible_estab_and_case_type(request.case_type, request.estab_type)?;
        validate_ce_residents(request.case_type, request.ce_usual_residents)?;

        let address_type = derive_address_type(request.estab_type, request.case_type)
            .ok_or_else(|| {
                CaseError::invalid(format!(
                    "No address type for case type '{}'",
                    request.case_type
                ))
            })?;
        let cached = cached_case_from_request(&request, Uuid::new_v4(), address_type, Utc::now());

        info!(
            case_id = %cached.id,
            case_type = %cached.case_type,
            address_type = %address_type,
            "Creating case for new address"
        );
        let cached = self.store_new_case(cached).await?;
        Ok(case_from_cached(&cached, false))
    }

    /// Cache a freshly minted case and announce it. The cache entry is
    /// withdrawn again if the announcement cannot be published.
    async fn store_new_case(&self, cached: CachedCase) -> Result<CachedCase> {
        self.cache.write(cached.clone()).await?;

        let payload = NewAddress {
            source_case_id: None,
            collection_case: NewAddressCase {
                id: cached.id,
                case_type: cached.case_type,
                survey: SURVEY_TYPE_CENSUS.to_string(),
                ce_expected_capacity: cached.ce_usual_residents,
                address: address_from_cached(&cached),
            },
        };
        if let Err(err) = self.emit(EventPayload::NewAddress(payload)).await {
            warn!(
                case_id = %cached.id,
                error = %err,
                "New address not published, withdrawing cached case"
            );
            if let Err(remove_err) = self.cache.remove(&cached).await {
                error!(
                    case_id = %cached.id,
                    error = %remove_err,
                    "Failed to withdraw cached case"
                );
            }
            return Err(err);
        }
        Ok(cached)
    }

    /// Report that an address no longer holds a valid case.
    pub async fn invalidate_case(&self, request: InvalidateCaseRequest) -> Result<ResponseDto> {
        info!(case_id = %request.case_id, status = %request.status, "Invalidate case");
        let case = self.resolve_registry_only(request.case_id).await?;
        validate_invalidation(&case)?;

        self.emit(EventPayload::AddressNotValid(AddressNotValid {
            collection_case: CollectionCaseCompact { id: case.id },
            notes: request.notes,
            reason: request.status.to_string(),
        }))
        .await?;
        Ok(ResponseDto::now(case.id.to_string()))
    }

    /// Correct the address details of an existing case.
    pub async fn modify_case(&self, request: ModifyCaseRequest) -> Result<ResponseDto> {
        info!(case_id = %request.case_id, "Modify case");
        validate_compatible_estab_and_case_type(request.case_type, request.estab_type)?;
        validate_ce_residents(request.case_type, request.ce_usual_residents)?;

        let case = self.resolve_registry_only(request.case_id).await?;
        let modification = AddressModification {
            collection_case: CollectionCaseCompact { id: case.id },
            original_address: address_compact_from_case(&case),
            new_address: address_compact_from_modify(&request, &case),
        };
        self.emit(EventPayload::AddressModification(modification))
            .await?;
        Ok(ResponseDto::now(case.id.to_string()))
    }
}
