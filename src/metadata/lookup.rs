use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::MetadataSettings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoInfo {
    pub title: String,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("metadata request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("metadata service answered with status {0}")]
    Status(u16),
    #[error("unreadable metadata response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Title/thumbnail search keyed on a free-text query. Blocking.
pub trait MetadataLookup: Send + Sync {
    fn lookup(&self, query: &str) -> Result<Option<VideoInfo>, LookupError>;
}

/// YouTube Data API v3 `search` endpoint.
pub struct YoutubeLookup {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl YoutubeLookup {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LookupError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    /// `None` when lookups are disabled or no key is configured.
    pub fn from_settings(settings: &MetadataSettings) -> Result<Option<Self>, LookupError> {
        let key = settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty());
        match key {
            Some(key) if settings.enabled => Self::new(
                settings.endpoint.clone(),
                key,
                Duration::from_millis(settings.timeout_ms),
            )
            .map(Some),
            _ => Ok(None),
        }
    }
}

impl MetadataLookup for YoutubeLookup {
    fn lookup(&self, query: &str) -> Result<Option<VideoInfo>, LookupError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("part", "snippet"),
                ("type", "video"),
                ("maxResults", "1"),
                ("q", query),
                ("key", self.api_key.as_str()),
            ])
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }
        let body = resp.text()?;
        debug!(bytes = body.len(), "metadata response received");
        parse_search_response(&body)
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    snippet: Snippet,
}

#[derive(Deserialize)]
struct Snippet {
    title: String,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Deserialize, Default)]
struct Thumbnails {
    high: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    #[serde(rename = "default")]
    fallback: Option<Thumbnail>,
}

#[derive(Deserialize)]
struct Thumbnail {
    url: String,
}

pub(crate) fn parse_search_response(body: &str) -> Result<Option<VideoInfo>, LookupError> {
    let parsed: SearchResponse = serde_json::from_str(body)?;
    Ok(parsed.items.into_iter().next().map(|item| {
        let Snippet { title, thumbnails } = item.snippet;
        let thumbnail_url = thumbnails
            .high
            .or(thumbnails.medium)
            .or(thumbnails.fallback)
            .map(|t| t.url);
        VideoInfo {
            title: unescape_html(&title),
            thumbnail_url,
        }
    }))
}

/// Search titles arrive HTML-escaped.
fn unescape_html(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
