//! Redis case cache.

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use tracing::{debug, info};
use uuid::Uuid;

use super::{CaseCache, Result};
use crate::model::{CachedCase, UniquePropertyReferenceNumber};

/// Redis-backed case cache.
///
/// Cases are stored as JSON under `{prefix}:case:{id}`. The UPRN index is a
/// plain string key `{prefix}:uprn:{uprn}` holding the id of the first case
/// written for that address.
pub struct RedisCaseCache {
    conn: ConnectionManager,
    key_prefix: String,
}

impl RedisCaseCache {
    /// Create a new Redis case cache.
    ///
    /// # Arguments
    /// * `url` - Redis connection URL (e.g., redis://localhost:6379)
    /// * `key_prefix` - Prefix for all keys (default: "ccsvc")
    pub async fn new(url: &str, key_prefix: Option<&str>) -> Result<Self> {
        let client = Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;

        info!(url = %url, "Connected to Redis for case cache");

        Ok(Self {
            conn,
            key_prefix: key_prefix.unwrap_or("ccsvc").to_string(),
        })
    }

    fn case_key(&self, id: Uuid) -> String {
        format!("{}:case:{}", self.key_prefix, id)
    }

    fn uprn_key(&self, uprn: UniquePropertyReferenceNumber) -> String {
        format!("{}:uprn:{}", self.key_prefix, uprn)
    }
}

#[async_trait]
impl CaseCache for RedisCaseCache {
    async fn read_by_id(&self, id: Uuid) -> Result<Option<CachedCase>> {
        let mut conn = self.conn.clone();
        let json: Option<String> = conn.get(self.case_key(id)).await?;

        match json {
            Some(json) => {
                debug!(case_id = %id, "Cached case found in Redis");
                Ok(Some(serde_json::from_str(&json)?))
            }
            None => Ok(None),
        }
    }

    async fn read_by_uprn(
        &self,
        uprn: UniquePropertyReferenceNumber,
    ) -> Result<Option<CachedCase>> {
        let mut conn = self.conn.clone();
        let id: Option<String> = conn.get(self.uprn_key(uprn)).await?;

        match id.and_then(|id| Uuid::parse_str(&id).ok()) {
            Some(id) => self.read_by_id(id).await,
            None => Ok(None),
        }
    }

    async fn write(&self, case: CachedCase) -> Result<()> {
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(&case)?;

        let _: () = conn.set(self.case_key(case.id), json).await?;
        if let Some(uprn) = case.uprn {
            // NX keeps the first case reported for the address.
            let _: bool = conn
                .set_nx(self.uprn_key(uprn), case.id.to_string())
                .await?;
        }

        debug!(case_id = %case.id, "Stored case in Redis");
        Ok(())
    }

    async fn remove(&self, case: &CachedCase) -> Result<()> {
        let mut conn = self.conn.clone();

        if let Some(uprn) = case.uprn {
            let key = self.uprn_key(uprn);
            let indexed: Option<String> = conn.get(&key).await?;
            if indexed.as_deref() == Some(case.id.to_string().as_str()) {
                let _: () = conn.del(&key).await?;
            }
        }
        let _: () = conn.del(self.case_key(case.id)).await?;

        debug!(case_id = %case.id, "Removed case from Redis");
        Ok(())
    }
}
