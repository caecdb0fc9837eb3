//! In-memory case cache.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CacheError, CaseCache, Result};
use crate::model::{CachedCase, UniquePropertyReferenceNumber};

/// Case cache held in process memory.
///
/// Serves single-instance deployments and tests. The UPRN index keeps the
/// ids in write order so the first case reported for an address wins.
#[derive(Default)]
pub struct InMemoryCaseCache {
    cases: RwLock<HashMap<Uuid, CachedCase>>,
    by_uprn: RwLock<HashMap<UniquePropertyReferenceNumber, Vec<Uuid>>>,
    fail_on_read: RwLock<bool>,
    fail_on_write: RwLock<bool>,
}

impl InMemoryCaseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_fail_on_read(&self, fail: bool) {
        *self.fail_on_read.write().await = fail;
    }

    pub async fn set_fail_on_write(&self, fail: bool) {
        *self.fail_on_write.write().await = fail;
    }

    pub async fn len(&self) -> usize {
        self.cases.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cases.read().await.is_empty()
    }

    async fn check_read(&self) -> Result<()> {
        if *self.fail_on_read.read().await {
            return Err(CacheError::Unavailable("Mock read failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CaseCache for InMemoryCaseCache {
    async fn read_by_id(&self, id: Uuid) -> Result<Option<CachedCase>> {
        self.check_read().await?;
        Ok(self.cases.read().await.get(&id).cloned())
    }

    async fn read_by_uprn(
        &self,
        uprn: UniquePropertyReferenceNumber,
    ) -> Result<Option<CachedCase>> {
        self.check_read().await?;
        let by_uprn = self.by_uprn.read().await;
        let cases = self.cases.read().await;
        Ok(by_uprn
            .get(&uprn)
            .and_then(|ids| ids.first())
            .and_then(|id| cases.get(id))
            .cloned())
    }

    async fn write(&self, case: CachedCase) -> Result<()> {
        if *self.fail_on_write.read().await {
            return Err(CacheError::Unavailable("Mock write failure".to_string()));
        }
        // Same lock order as read_by_uprn, so an indexed id always has its case.
        let mut by_uprn = self.by_uprn.write().await;
        let mut cases = self.cases.write().await;
        if let Some(uprn) = case.uprn {
            let ids = by_uprn.entry(uprn).or_default();
            if !ids.contains(&case.id) {
                ids.push(case.id);
            }
        }
        cases.insert(case.id, case);
        Ok(())
    }

    async fn remove(&self, case: &CachedCase) -> Result<()> {
        let mut by_uprn = self.by_uprn.write().await;
        let mut cases = self.cases.write().await;
        if let Some(uprn) = case.uprn {
            if let Some(ids) = by_uprn.get_mut(&uprn) {
                ids.retain(|id| *id != case.id);
                if ids.is_empty() {
                    by_uprn.remove(&uprn);
                }
            }
        }
        cases.remove(&case.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use super::*;
    use crate::model::{AddressType, CaseType, EstabType};

    fn cached(uprn: Option<u64>) -> CachedCase {
        CachedCase {
            id: Uuid::new_v4(),
            uprn: uprn.map(|u| UniquePropertyReferenceNumber::new(u).unwrap()),
            case_type: CaseType::HH,
            address_type: AddressType::HH,
            estab_type: EstabType::Household,
            region: "E1000001".to_string(),
            address_line1: "1 Main Street".to_string(),
            address_line2: String::new(),
            address_line3: String::new(),
            town_name: "Exeter".to_string(),
            postcode: "EX1 1AA".to_string(),
            organisation_name: String::new(),
            ce_usual_residents: None,
            created_date_time: Utc::now(),
            case_events: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_write_then_read_by_id_and_uprn() {
        let cache = InMemoryCaseCache::new();
        let case = cached(Some(100041045018));

        cache.write(case.clone()).await.unwrap();

        assert_eq!(cache.read_by_id(case.id).await.unwrap(), Some(case.clone()));
        let uprn = UniquePropertyReferenceNumber::new(100041045018).unwrap();
        assert_eq!(cache.read_by_uprn(uprn).await.unwrap(), Some(case));
    }

    #[tokio::test]
    async fn test_first_case_for_uprn_wins() {
        let cache = InMemoryCaseCache::new();
        let first = cached(Some(42));
        let second = cached(Some(42));

        cache.write(first.clone()).await.unwrap();
        cache.write(second).await.unwrap();

        let uprn = UniquePropertyReferenceNumber::new(42).unwrap();
        assert_eq!(cache.read_by_uprn(uprn).await.unwrap().map(|c| c.id), Some(first.id));
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn test_case_without_uprn_only_indexed_by_id() {
        let cache = InMemoryCaseCache::new();
        let case = cached(None);
        cache.write(case.clone()).await.unwrap();

        assert!(cache.read_by_id(case.id).await.unwrap().is_some());
        assert!(cache.by_uprn.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_remove_restores_earlier_case_for_uprn() {
        let cache = InMemoryCaseCache::new();
        let first = cached(Some(42));
        let second = cached(Some(42));
        cache.write(first.clone()).await.unwrap();
        cache.write(second.clone()).await.unwrap();

        cache.remove(&first).await.unwrap();

        let uprn = UniquePropertyReferenceNumber::new(42).unwrap();
        assert_eq!(cache.read_by_uprn(uprn).await.unwrap().map(|c| c.id), Some(second.id));
        cache.remove(&second).await.unwrap();
        assert!(cache.read_by_uprn(uprn).await.unwrap().is_none());
        assert!(cache.is_empty().await);
        assert!(cache.by_uprn.read().await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_indexed_uprn_always_resolves_under_concurrent_writes() {
        let cache = Arc::new(InMemoryCaseCache::new());
        let uprns: Vec<u64> = (1..=200).collect();

        let writer = {
            let cache = cache.clone();
            let uprns = uprns.clone();
            tokio::spawn(async move {
                for uprn in uprns {
                    cache.write(cached(Some(uprn))).await.unwrap();
                }
            })
        };
        let reader = {
            let cache = cache.clone();
            tokio::spawn(async move {
                let mut misses = 0;
                while cache.len().await < 200 {
                    let indexed: Vec<UniquePropertyReferenceNumber> =
                        cache.by_uprn.read().await.keys().copied().collect();
                    for uprn in indexed {
                        if cache.read_by_uprn(uprn).await.unwrap().is_none() {
                            misses += 1;
                        }
                    }
                    tokio::task::yield_now().await;
                }
                misses
            })
        };

        writer.await.unwrap();
        assert_eq!(reader.await.unwrap(), 0);
        for uprn in uprns {
            let uprn = UniquePropertyReferenceNumber::new(uprn).unwrap();
            assert!(cache.read_by_uprn(uprn).await.unwrap().is_some());
        }
    }

    #[tokio::test]
    async fn test_failure_toggles() {
        let cache = InMemoryCaseCache::new();
        cache.set_fail_on_write(true).await;
        assert!(cache.write(cached(None)).await.is_err());
        assert!(cache.is_empty().await);

        cache.set_fail_on_read(true).await;
        assert!(cache.read_by_id(Uuid::new_v4()).await.is_err());
    }
}
