use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use super::errors::ServiceError;
use super::protocol::{
    ConfirmFinalRequest, ConfirmFinalResponse, Endpoint, FilterOptionsRequest,
    FilterOptionsResponse, GenerateOptionsRequest, GenerateOptionsResponse,
};
use super::traits::DialogueService;
use crate::config::ServiceConfig;

/// [`DialogueService`] over HTTP with JSON bodies.
#[derive(Debug, Clone)]
pub struct HttpDialogueService {
    client: Client,
    base_url: String,
}

impl HttpDialogueService {
    /// `timeout` of `None` leaves reqwest's default (no overall timeout).
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .context("Failed to build the dialogue service HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        Self::new(
            &config.base_url,
            config.timeout_seconds.map(Duration::from_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    async fn post_json<Req, Resp>(
        &self,
        endpoint: Endpoint,
        body: &Req,
    ) -> Result<Resp, ServiceError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let url = self.url(endpoint);
        debug!(url = %url, "Posting to dialogue service");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::Connectivity {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ServiceError::Status {
                endpoint,
                code: status.as_u16(),
            });
        }

        response
            .json::<Resp>()
            .await
            .map_err(|e| ServiceError::InvalidResponse {
                endpoint,
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl DialogueService for HttpDialogueService {
    async fn generate_options(
        &self,
        request: GenerateOptionsRequest,
    ) -> Result<GenerateOptionsResponse, ServiceError> {
        self.post_json(Endpoint::GenerateOptions, &request).await
    }

    async fn filter_options(
        &self,
        request: FilterOptionsRequest,
    ) -> Result<FilterOptionsResponse, ServiceError> {
        self.post_json(Endpoint::FilterOptions, &request).await
    }

    async fn confirm_final(
        &self,
        request: ConfirmFinalRequest,
    ) -> Result<ConfirmFinalResponse, ServiceError> {
        self.post_json(Endpoint::ConfirmFinal, &request).await
    }
}
