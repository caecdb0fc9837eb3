//! Address index client.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{HttpClient, Result};
use crate::config::AddressIndexConfig;
use crate::model::{AddressRecord, UniquePropertyReferenceNumber};

/// Canonical address lookup by UPRN.
#[async_trait]
pub trait AddressLookup: Send + Sync {
    async fn query_by_uprn(&self, uprn: UniquePropertyReferenceNumber) -> Result<AddressRecord>;
}

#[derive(Debug, Deserialize)]
struct AddressIndexResponse {
    response: AddressIndexBody,
}

#[derive(Debug, Deserialize)]
struct AddressIndexBody {
    address: AddressRecord,
}

/// reqwest implementation of [`AddressLookup`].
pub struct HttpAddressLookup {
    http: HttpClient,
}

impl HttpAddressLookup {
    pub fn new(config: &AddressIndexConfig) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new("address index", &config.base_url, config.timeout())?,
        })
    }
}

#[async_trait]
impl AddressLookup for HttpAddressLookup {
    async fn query_by_uprn(&self, uprn: UniquePropertyReferenceNumber) -> Result<AddressRecord> {
        debug!(uprn = %uprn, "Address index lookup");
        let response: AddressIndexResponse = self
            .http
            .get_json(&format!("/addresses/rh/uprn/{}", uprn), &[])
            .await?;
        Ok(response.response.address)
    }
}
