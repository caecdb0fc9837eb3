//! Launch token encoder client.

use async_trait::async_trait;

use super::{HttpClient, Result};
use crate::config::LaunchConfig;
use crate::model::LaunchData;

/// Turns launch data into the opaque token appended to the questionnaire
/// URL. Encryption happens on the far side.
#[async_trait]
pub trait LaunchTokenEncoder: Send + Sync {
    async fn encode(&self, data: &LaunchData) -> Result<String>;
}

/// reqwest implementation of [`LaunchTokenEncoder`].
pub struct HttpLaunchTokenEncoder {
    http: HttpClient,
}

impl HttpLaunchTokenEncoder {
    pub fn new(config: &LaunchConfig) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new("launch token encoder", &config.encoder_url, config.timeout())?,
        })
    }
}

#[async_trait]
impl LaunchTokenEncoder for HttpLaunchTokenEncoder {
    async fn encode(&self, data: &LaunchData) -> Result<String> {
        let token = self.http.post_text("", data).await?;
        Ok(token.trim().to_string())
    }
}
