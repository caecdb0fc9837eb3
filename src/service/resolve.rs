//! Case resolution: registry first, cache on a registry miss.

use tracing::debug;
use uuid::Uuid;

use super::{CaseService, REGISTRY};
use crate::error::{CaseError, Result};
use crate::model::mapping::{case_from_cached, case_from_registry};
use crate::model::Case;

/// Where a resolved case came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseSource {
    Registry,
    Cache,
}

/// A case together with its origin.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub source: CaseSource,
    pub case: Case,
}

impl CaseService {
    /// Resolve a case by id.
    ///
    /// Only a registry not-found falls back to the cache. Any other registry
    /// failure propagates, and a miss in both surfaces the registry's
    /// not-found.
    pub async fn resolve_case(&self, id: Uuid, include_events: bool) -> Result<Resolved> {
        match self.registry.get_case_by_id(id, include_events).await {
            Ok(registry_case) => Ok(Resolved {
                source: CaseSource::Registry,
                case: case_from_registry(registry_case, include_events, &self.event_whitelist),
            }),
            Err(err) if err.is_not_found() => {
                debug!(case_id = %id, "Registry miss, checking cache");
                match self.cache.read_by_id(id).await? {
                    Some(cached) => Ok(Resolved {
                        source: CaseSource::Cache,
                        case: case_from_cached(&cached, include_events),
                    }),
                    None => Err(CaseError::upstream(REGISTRY, err)),
                }
            }
            Err(err) => Err(CaseError::upstream(REGISTRY, err)),
        }
    }

    /// Resolve a case that must already be authoritative.
    pub(crate) async fn resolve_registry_only(&self, id: Uuid) -> Result<Case> {
        let registry_case = self
            .registry
            .get_case_by_id(id, false)
            .await
            .map_err(|e| CaseError::upstream(REGISTRY, e))?;
        Ok(case_from_registry(registry_case, false, &self.event_whitelist))
    }
}
