//! Remote conversion service boundary: the `ConversionApi` trait and its
//! reqwest-backed implementation.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    error::ApiError,
    protocol::{ConversionRecord, ConvertRequest, HistoryPage, HistoryQuery},
};
use thiserror::Error;
use url::Url;

pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(15_000);

/// Message used when a non-2xx response carries no parseable body.
const FALLBACK_SERVER_MESSAGE: &str = "An error occurred while processing your request";

/// Failures at the service boundary, already normalized: the display string
/// of each variant is exactly what the store (and the user) sees.
#[derive(Debug, Error)]
pub enum ApiClientError {
    /// The service answered with a non-2xx status and a message.
    #[error("{0}")]
    Server(String),
    /// The request went out but no response came back.
    #[error("No response from server. Please check your connection")]
    NoResponse,
    /// The request could not be built or dispatched at all.
    #[error("Failed to make request. Please try again later")]
    RequestSetup,
}

#[async_trait]
pub trait ConversionApi: Send + Sync {
    async fn convert(&self, code: &str) -> Result<ConversionRecord, ApiClientError>;
    async fn fetch_history(&self, query: &HistoryQuery) -> Result<HistoryPage, ApiClientError>;
    async fn fetch_record(&self, id: &str) -> Result<ConversionRecord, ApiClientError>;
}

pub struct MissingConversionApi;

#[async_trait]
impl ConversionApi for MissingConversionApi {
    async fn convert(&self, _code: &str) -> Result<ConversionRecord, ApiClientError> {
        Err(ApiClientError::Server(
            "conversion service is not configured".to_string(),
        ))
    }

    async fn fetch_history(
        &self,
        _query: &HistoryQuery,
    ) -> Result<HistoryPage, ApiClientError> {
        Err(ApiClientError::Server(
            "conversion service is not configured".to_string(),
        ))
    }

    async fn fetch_record(&self, _id: &str) -> Result<ConversionRecord, ApiClientError> {
        Err(ApiClientError::Server(
            "conversion service is not configured".to_string(),
        ))
    }
}

pub struct HttpConversionApi {
    http: Client,
    base_url: String,
}

impl HttpConversionApi {
    pub fn new(base_url: &str) -> Result<Self> {
        let parsed = Url::parse(base_url)
            .with_context(|| format!("invalid conversion service url '{base_url}'"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("conversion service url must use http or https: '{base_url}'");
        }

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build http client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ConversionApi for HttpConversionApi {
    async fn convert(&self, code: &str) -> Result<ConversionRecord, ApiClientError> {
        let response = self
            .http
            .post(format!("{}/convert", self.base_url))
            .json(&ConvertRequest {
                code: code.to_string(),
            })
            .send()
            .await
            .map_err(classify_transport_error)?;
        read_json(response).await
    }

    async fn fetch_history(&self, query: &HistoryQuery) -> Result<HistoryPage, ApiClientError> {
        let response = self
            .http
            .get(format!("{}/history", self.base_url))
            .query(query)
            .send()
            .await
            .map_err(classify_transport_error)?;
        read_json(response).await
    }

    async fn fetch_record(&self, id: &str) -> Result<ConversionRecord, ApiClientError> {
        let response = self
            .http
            .get(format!("{}/history/{id}", self.base_url))
            .send()
            .await
            .map_err(classify_transport_error)?;
        read_json(response).await
    }
}

fn classify_transport_error(err: reqwest::Error) -> ApiClientError {
    if err.is_builder() {
        ApiClientError::RequestSetup
    } else if err.is_decode() {
        // A response arrived but its body was unusable.
        ApiClientError::Server(FALLBACK_SERVER_MESSAGE.to_string())
    } else {
        ApiClientError::NoResponse
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiClientError> {
    if !response.status().is_success() {
        return Err(extract_server_error(response).await);
    }
    response.json::<T>().await.map_err(classify_transport_error)
}

async fn extract_server_error(response: Response) -> ApiClientError {
    match response.json::<ApiError>().await {
        Ok(body) => ApiClientError::Server(body.message),
        Err(_) => ApiClientError::Server(FALLBACK_SERVER_MESSAGE.to_string()),
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
