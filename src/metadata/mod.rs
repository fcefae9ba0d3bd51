//! Video metadata lookup used to enrich analysis requests.

mod oembed;

pub use oembed::{OEmbedClient, DEFAULT_OEMBED_ENDPOINT};

use crate::server::metrics::record_metadata_lookup;
use crate::source::{classify_source, extract_video_id, SourceKind};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Title and author of a video, as reported by oEmbed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub author_name: String,
}

impl VideoMetadata {
    /// Renders the metadata as context for the analysis instruction.
    pub fn to_context(&self) -> String {
        format!(
            "The user provided a YouTube link. Metadata from the link: Title: \"{}\", Author: \"{}\".",
            self.title, self.author_name
        )
    }
}

#[derive(Debug, Error)]
pub enum MetadataFetchError {
    #[error("Metadata request failed: {0}")]
    Request(String),

    #[error("Metadata lookup returned status {0}")]
    Status(u16),

    #[error("Could not parse metadata response: {0}")]
    Parse(String),
}

#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    async fn fetch(&self, video_id: &str) -> Result<VideoMetadata, MetadataFetchError>;
}

/// Builds the optional context string for `source`.
///
/// Free-text sources get no context. For links, a missing video id or any
/// lookup failure is logged and degrades to no context.
pub async fn enrichment_context(source: &str, fetcher: &dyn MetadataFetcher) -> Option<String> {
    if classify_source(source) != SourceKind::Url {
        return None;
    }

    let Some(video_id) = extract_video_id(source) else {
        warn!(source, "Could not extract a valid video id from the provided URL");
        record_metadata_lookup("no_video_id");
        return None;
    };

    match fetcher.fetch(&video_id).await {
        Ok(metadata) => {
            debug!(video_id = %video_id, title = %metadata.title, "Fetched video metadata");
            record_metadata_lookup("success");
            Some(metadata.to_context())
        }
        Err(e) => {
            warn!(video_id = %video_id, error = %e, "Video metadata lookup failed, continuing without context");
            record_metadata_lookup("failure");
            None
        }
    }
}
