//! Shared JSON-over-HTTP plumbing for collaborator clients.

use std::time::Duration;

use backon::Retryable;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::{HttpClientError, Result};
use crate::utils::retry::http_backoff;

/// reqwest client bound to one collaborator's base URL.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    service: &'static str,
}

impl HttpClient {
    pub fn new(service: &'static str, base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET `path` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.url(path);
        let body = self
            .send_with_retry(&url, || self.client.get(&url).query(query))
            .await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// POST a JSON body to `path` and decode the JSON response.
    pub async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let body = self.post_text(path, body).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// POST a JSON body to `path` and return the raw response text.
    pub async fn post_text<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<String> {
        let url = self.url(path);
        self.send_with_retry(&url, || self.client.post(&url).json(body))
            .await
    }

    async fn send_with_retry<F>(&self, url: &str, build: F) -> Result<String>
    where
        F: Fn() -> RequestBuilder,
    {
        (|| async {
            let response = build().send().await.map_err(HttpClientError::from)?;
            Self::read_body(url, response).await
        })
        .retry(http_backoff())
        .when(HttpClientError::is_retryable)
        .notify(|err, delay| {
            warn!(
                service = self.service,
                url = %url,
                error = %err,
                delay_ms = delay.as_millis() as u64,
                "Collaborator call failed, retrying"
            );
        })
        .await
    }

    async fn read_body(url: &str, response: Response) -> Result<String> {
        let status = response.status();
        if status.is_success() {
            debug!(url = %url, status = %status, "Collaborator call succeeded");
            return Ok(response.text().await?);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::NOT_FOUND {
            return Err(HttpClientError::NotFound(format!("{} returned 404", url)));
        }
        Err(HttpClientError::Status {
            status: status.as_u16(),
            body: body.chars().take(200).collect(),
        })
    }
}
