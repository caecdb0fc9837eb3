//! Case resolution and orchestration engine.
//!
//! `CaseService` composes the registry, cache, address index, product
//! catalogue, launch token encoder and event publisher. Each public method
//! handles one agent request end to end: resolve the case, apply the
//! business rules, call collaborators, and publish at most one event.
//!
//! The engine holds no locks and no per-request state. The registry is the
//! source of truth; the cache is consulted only when the registry misses.

mod cases;
mod fulfilment;
mod launch;
mod refusal;
mod resolve;

pub use resolve::{CaseSource, Resolved};

use std::sync::Arc;

use tracing::info;

use crate::bus::{EventPublisher, LoggingPublisher, RetryingPublisher};
use crate::cache::{init_cache, CacheError, CaseCache};
use crate::clients::{
    AddressLookup, CaseRegistry, HttpAddressLookup, HttpCaseRegistry, HttpClientError,
    HttpLaunchTokenEncoder, LaunchTokenEncoder,
};
use crate::config::{Config, LaunchConfig};
use crate::error::Result;
use crate::model::{Channel, EventEnvelope, EventPayload, Source};
use crate::products::{ProductError, ProductMatcher, ProductReference};

pub(crate) const REGISTRY: &str = "case registry";
pub(crate) const ADDRESS_INDEX: &str = "address index";
pub(crate) const LAUNCH_ENCODER: &str = "launch token encoder";

/// Errors building a service from configuration.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] HttpClientError),

    #[error("Failed to initialise cache: {0}")]
    Cache(#[from] CacheError),

    #[error("Failed to load products: {0}")]
    Products(#[from] ProductError),
}

/// The engine's collaborators.
#[derive(Clone)]
pub struct Collaborators {
    pub registry: Arc<dyn CaseRegistry>,
    pub address_lookup: Arc<dyn AddressLookup>,
    pub cache: Arc<dyn CaseCache>,
    pub publisher: Arc<dyn EventPublisher>,
    pub products: Arc<dyn ProductMatcher>,
    pub encoder: Arc<dyn LaunchTokenEncoder>,
}

/// Orchestration engine for contact-centre case operations.
#[derive(Clone)]
pub struct CaseService {
    registry: Arc<dyn CaseRegistry>,
    address_lookup: Arc<dyn AddressLookup>,
    cache: Arc<dyn CaseCache>,
    publisher: Arc<dyn EventPublisher>,
    products: Arc<dyn ProductMatcher>,
    encoder: Arc<dyn LaunchTokenEncoder>,
    launch: LaunchConfig,
    event_whitelist: Vec<String>,
}

impl CaseService {
    pub fn new(
        collaborators: Collaborators,
        launch: LaunchConfig,
        event_whitelist: Vec<String>,
    ) -> Self {
        let Collaborators {
            registry,
            address_lookup,
            cache,
            publisher,
            products,
            encoder,
        } = collaborators;
        Self {
            registry,
            address_lookup,
            cache,
            publisher,
            products,
            encoder,
            launch,
            event_whitelist,
        }
    }

    /// Wire the HTTP collaborators, configured cache, product catalogue and
    /// a retrying logging publisher.
    pub async fn from_config(config: &Config) -> std::result::Result<Self, InitError> {
        let registry = Arc::new(HttpCaseRegistry::new(&config.registry)?);
        let address_lookup = Arc::new(HttpAddressLookup::new(&config.address_index)?);
        let encoder = Arc::new(HttpLaunchTokenEncoder::new(&config.launch)?);
        let cache = init_cache(&config.cache).await?;
        let products = Arc::new(ProductReference::from_config(&config.products)?);
        let publisher = Arc::new(RetryingPublisher::new(
            Arc::new(LoggingPublisher::new()),
            config.publish.clone(),
        ));

        info!(
            registry = %config.registry.base_url,
            address_index = %config.address_index.base_url,
            cache = %config.cache.cache_type,
            "Case service initialised"
        );

        Ok(Self::new(
            Collaborators {
                registry,
                address_lookup,
                cache,
                publisher,
                products,
                encoder,
            },
            config.launch.clone(),
            config.case_events.whitelisted_event_categories.clone(),
        ))
    }

    /// Wrap a payload in a CC envelope and hand it to the publisher.
    async fn emit(&self, payload: EventPayload) -> Result<()> {
        let envelope = EventEnvelope::new(
            payload.event_type(),
            Source::ContactCentreApi,
            Channel::Cc,
            payload,
        );
        info!(
            event_type = %envelope.event_type(),
            transaction_id = %envelope.event.transaction_id,
            "Publishing event"
        );
        self.publisher.publish(Arc::new(envelope)).await?;
        Ok(())
    }
}
