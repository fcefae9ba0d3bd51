//! Classification of user-supplied sources.
//!
//! A source is either a YouTube link, which can be enriched with oEmbed
//! metadata, or free text such as a song title or an uploaded file name.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref YOUTUBE_URL_REGEX: Regex =
        Regex::new(r"^(https?://)?(www\.)?(youtube\.com|youtu\.?be)/.+$").unwrap();
    static ref VIDEO_ID_REGEX: Regex = Regex::new(r"(?:v=|/)([0-9A-Za-z_-]{11})").unwrap();
}

pub const YOUTUBE_WATCH_URL: &str = "https://www.youtube.com/watch";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Url,
    Freeform,
}

pub fn classify_source(text: &str) -> SourceKind {
    if YOUTUBE_URL_REGEX.is_match(text) {
        SourceKind::Url
    } else {
        SourceKind::Freeform
    }
}

/// Pulls the 11-character video id out of a `v=` query parameter or a path
/// segment. The first candidate in the string wins.
pub fn extract_video_id(url: &str) -> Option<String> {
    VIDEO_ID_REGEX
        .captures(url)
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str().to_string())
}

pub fn canonical_watch_url(video_id: &str) -> String {
    format!("{}?v={}", YOUTUBE_WATCH_URL, video_id)
}

pub fn oembed_request_url(endpoint: &str, video_id: &str) -> String {
    format!(
        "{}?url={}&format=json",
        endpoint,
        urlencoding::encode(&canonical_watch_url(video_id))
    )
}

/// Result of classifying a source, as reported to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceClassification {
    pub kind: SourceKind,
    pub video_id: Option<String>,
}

impl SourceClassification {
    pub fn of(text: &str) -> Self {
        let kind = classify_source(text);
        let video_id = match kind {
            SourceKind::Url => extract_video_id(text),
            SourceKind::Freeform => None,
        };
        Self { kind, video_id }
    }
}
