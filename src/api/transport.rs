//! HTTP seam under the API client.
//!
//! A transport performs the request and hands back status plus body, nothing more.
//! Classification, caching, retry and pagination all live in the client above this seam,
//! which is what lets the demo and test transports stand in for the real thing.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::ApiError;

/// A raw response before any classification.
#[derive(Debug, Clone)]
pub(crate) struct Wire {
    pub(crate) status: u16,
    pub(crate) body: String,
}

impl Wire {
    pub(crate) fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }
}

#[async_trait]
pub(crate) trait Transport: Send + Sync {
    async fn get(&self, url: &str, token: &str) -> Result<Wire, ApiError>;

    async fn post(
        &self,
        url: &str,
        token: &str,
        body: serde_json::Value,
    ) -> Result<Wire, ApiError>;

    async fn patch(
        &self,
        url: &str,
        token: &str,
        body: serde_json::Value,
    ) -> Result<Wire, ApiError>;
}

/// Real HTTP transport. Timeouts and connection failures surface as network errors; HTTP
/// error statuses pass through untouched for the client to classify.
pub(crate) struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub(crate) fn new(timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(network_error)?;
        Ok(Self { client })
    }

    async fn finish(response: reqwest::Response) -> Result<Wire, ApiError> {
        let status = response.status().as_u16();
        let body = response.text().await.map_err(network_error)?;
        Ok(Wire { status, body })
    }
}

fn network_error(err: reqwest::Error) -> ApiError {
    ApiError::Network(err.to_string())
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, token: &str) -> Result<Wire, ApiError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(network_error)?;
        Self::finish(response).await
    }

    async fn post(
        &self,
        url: &str,
        token: &str,
        body: serde_json::Value,
    ) -> Result<Wire, ApiError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(network_error)?;
        Self::finish(response).await
    }

    async fn patch(
        &self,
        url: &str,
        token: &str,
        body: serde_json::Value,
    ) -> Result<Wire, ApiError> {
        let response = self
            .client
            .patch(url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(network_error)?;
        Self::finish(response).await
    }
}
