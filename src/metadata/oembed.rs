//! HTTP client for the YouTube oEmbed endpoint.

use super::{MetadataFetchError, MetadataFetcher, VideoMetadata};
use crate::source::oembed_request_url;
use async_trait::async_trait;
use std::time::Duration;

pub const DEFAULT_OEMBED_ENDPOINT: &str = "https://www.youtube.com/oembed";

pub struct OEmbedClient {
    client: reqwest::Client,
    endpoint: String,
}

impl OEmbedClient {
    /// Create a new oEmbed client.
    ///
    /// # Arguments
    /// * `endpoint` - oEmbed endpoint (e.g., "https://www.youtube.com/oembed")
    /// * `timeout` - Request timeout
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, MetadataFetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MetadataFetchError::Request(e.to_string()))?;
        let endpoint: String = endpoint.into();

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl MetadataFetcher for OEmbedClient {
    async fn fetch(&self, video_id: &str) -> Result<VideoMetadata, MetadataFetchError> {
        let url = oembed_request_url(&self.endpoint, video_id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MetadataFetchError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MetadataFetchError::Status(response.status().as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| MetadataFetchError::Parse(e.to_string()))
    }
}
