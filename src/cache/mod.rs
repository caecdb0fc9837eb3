//! Local cache of cases created for addresses the registry does not know.
//!
//! Cached cases are written once, when an agent reports a new address or a
//! UPRN lookup falls through to the address index, and read back on by-id
//! and by-UPRN resolution when the registry misses.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::model::{CachedCase, UniquePropertyReferenceNumber};

pub mod memory;
#[cfg(feature = "redis")]
pub mod redis;

pub use memory::InMemoryCaseCache;
#[cfg(feature = "redis")]
pub use self::redis::RedisCaseCache;

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[cfg(feature = "redis")]
    #[error("Redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("Cache backend '{0}' not available in this build")]
    BackendNotEnabled(String),
}

/// Keyed store for locally created cases.
#[async_trait]
pub trait CaseCache: Send + Sync {
    async fn read_by_id(&self, id: Uuid) -> Result<Option<CachedCase>>;

    /// First cached case recorded for the UPRN, if any.
    async fn read_by_uprn(&self, uprn: UniquePropertyReferenceNumber)
        -> Result<Option<CachedCase>>;

    /// Store a case under its id and, when it has one, its UPRN.
    async fn write(&self, case: CachedCase) -> Result<()>;

    /// Drop a case. The UPRN index entry goes only if it points at this case.
    async fn remove(&self, case: &CachedCase) -> Result<()>;
}

// ============================================================================
// Configuration
// ============================================================================

/// Cache backend discriminator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheType {
    #[default]
    Memory,
    Redis,
}

impl fmt::Display for CacheType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheType::Memory => f.write_str("memory"),
            CacheType::Redis => f.write_str("redis"),
        }
    }
}

/// Cache configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    #[serde(rename = "type")]
    pub cache_type: CacheType,
    /// Redis connection URL, used when `type` is `redis`.
    pub url: String,
    pub key_prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_type: CacheType::Memory,
            url: "redis://localhost:6379".to_string(),
            key_prefix: "ccsvc".to_string(),
        }
    }
}

/// Build the configured cache backend.
pub async fn init_cache(config: &CacheConfig) -> Result<Arc<dyn CaseCache>> {
    info!(cache_type = %config.cache_type, "Initialising case cache");

    match config.cache_type {
        CacheType::Memory => Ok(Arc::new(InMemoryCaseCache::new())),
        #[cfg(feature = "redis")]
        CacheType::Redis => {
            let cache = RedisCaseCache::new(&config.url, Some(&config.key_prefix)).await?;
            Ok(Arc::new(cache))
        }
        #[cfg(not(feature = "redis"))]
        CacheType::Redis => Err(CacheError::BackendNotEnabled("redis".to_string())),
    }
}
