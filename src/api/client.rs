//! Catalog API HTTP client

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::debug;
use url::Url;

use super::models::*;

/// Failure to obtain the catalog from its source
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to reach catalog API: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("catalog API returned HTTP {0}")]
    Status(StatusCode),
    #[error("failed to parse catalog response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Anything that can produce the full catalog in one read
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_catalog(&self) -> Result<Vec<VideoRecord>, FetchError>;
}

/// HTTP client for the catalog REST API
#[derive(Clone)]
pub struct CatalogClient {
    endpoint: Url,
    http_client: Client,
}

impl CatalogClient {
    /// Create a new catalog client
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .with_context(|| format!("Invalid catalog API URL: {}", endpoint))?;

        let http_client = Client::builder()
            .user_agent(concat!("vidgrid/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            endpoint,
            http_client,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl CatalogSource for CatalogClient {
    async fn fetch_catalog(&self) -> Result<Vec<VideoRecord>, FetchError> {
        debug!("Fetching catalog from: {}", self.endpoint);

        let response = self
            .http_client
            .get(self.endpoint.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let bytes = response.bytes().await?;
        let records = parse_catalog(&bytes)?;

        debug!("Found {} videos", records.len());
        Ok(records)
    }
}

/// Decode a catalog document body
pub fn parse_catalog(body: &[u8]) -> Result<Vec<VideoRecord>, FetchError> {
    let response: CatalogResponse = serde_json::from_slice(body)?;
    Ok(response.into_records())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_catalog_body() {
        let body = br#"{"data":[{"id":1,"Nombre":"Uno","createdAt":"2024-03-01T00:00:00Z","imageURL":"i","driveURL":"d"}]}"#;
        let records = parse_catalog(body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, VideoId(1));
    }

    #[test]
    fn test_malformed_body_is_decode_error() {
        let err = parse_catalog(b"<html>oops</html>").unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));

        // a record missing required fields is malformed too
        let err = parse_catalog(br#"{"data":[{"id":1}]}"#).unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn test_status_error_message() {
        let err = FetchError::Status(StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.to_string(), "catalog API returned HTTP 503 Service Unavailable");
    }

    #[test]
    fn test_client_rejects_invalid_endpoint() {
        assert!(CatalogClient::new("not a url").is_err());
        let client = CatalogClient::new("https://example.com/api").unwrap();
        assert_eq!(client.endpoint().as_str(), "https://example.com/api");
    }
}
