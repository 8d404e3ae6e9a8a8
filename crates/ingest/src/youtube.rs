//! YouTube Data API v3 client for live-stream discovery.
//!
//! Two read paths: the search endpoint for currently live videos, and the
//! videos endpoint for per-id engagement statistics. Both sit behind the
//! [`LiveStreamSource`] trait so the collector never talks HTTP directly.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::IngestError;
use crate::Result;

const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// A live stream returned by the search endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveStreamItem {
    pub video_id: String,
    pub title: String,
    pub channel_title: String,
    pub published_at: DateTime<Utc>,
}

/// Engagement counters for a single video.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngagementStats {
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
}

/// Source of live streams and their engagement statistics.
#[async_trait]
pub trait LiveStreamSource: Send + Sync {
    /// Fetches the currently live streams.
    async fn search_live(&self) -> Result<Vec<LiveStreamItem>>;

    /// Fetches engagement statistics for one video. `None` when the API
    /// has no item for the id.
    async fn statistics(&self, video_id: &str) -> Result<Option<EngagementStats>>;
}

/// Client for the YouTube Data API v3.
pub struct YouTubeClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl YouTubeClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: YOUTUBE_API_BASE.to_string(),
        }
    }
}

#[async_trait]
impl LiveStreamSource for YouTubeClient {
    async fn search_live(&self) -> Result<Vec<LiveStreamItem>> {
        let url = format!(
            "{}/search?part=snippet&eventType=live&type=video&relevanceLanguage=en&hl=en&key={}",
            self.base_url, self.api_key
        );
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(IngestError::SearchFailed(format!(
                "search endpoint returned {}",
                response.status()
            )));
        }
        let body: Value = response.json().await?;
        Ok(parse_search_items(&body))
    }

    async fn statistics(&self, video_id: &str) -> Result<Option<EngagementStats>> {
        let url = format!(
            "{}/videos?part=statistics&id={}&key={}",
            self.base_url, video_id, self.api_key
        );
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(IngestError::StatsFailed {
                content_id: video_id.to_string(),
                message: format!("statistics endpoint returned {}", response.status()),
            });
        }
        let body: Value = response.json().await?;
        Ok(parse_statistics(&body))
    }
}

/// Extracts stream items from a search response, skipping malformed entries.
fn parse_search_items(body: &Value) -> Vec<LiveStreamItem> {
    let items = match body.get("items").and_then(Value::as_array) {
        Some(items) => items,
        None => return Vec::new(),
    };

    items
        .iter()
        .filter_map(|item| {
            let video_id = item
                .get("id")
                .and_then(|id| id.get("videoId"))
                .and_then(Value::as_str);
            let snippet = item.get("snippet");
            let title = snippet.and_then(|s| s.get("title")).and_then(Value::as_str);
            let channel_title = snippet
                .and_then(|s| s.get("channelTitle"))
                .and_then(Value::as_str);
            let published_at = snippet
                .and_then(|s| s.get("publishedAt"))
                .and_then(Value::as_str)
                .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
                .map(|dt| dt.with_timezone(&Utc));

            match (video_id, title, channel_title, published_at) {
                (Some(video_id), Some(title), Some(channel_title), Some(published_at)) => {
                    Some(LiveStreamItem {
                        video_id: video_id.to_string(),
                        title: title.to_string(),
                        channel_title: channel_title.to_string(),
                        published_at,
                    })
                }
                _ => {
                    tracing::warn!("skipping malformed search item");
                    None
                }
            }
        })
        .collect()
}

/// Extracts the first item's counters from a statistics response. Counters
/// arrive as JSON strings; absent or unparsable fields count as zero.
fn parse_statistics(body: &Value) -> Option<EngagementStats> {
    let stats = body
        .get("items")
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .and_then(|item| item.get("statistics"))?;

    Some(EngagementStats {
        view_count: counter(stats, "viewCount"),
        like_count: counter(stats, "likeCount"),
        comment_count: counter(stats, "commentCount"),
    })
}

fn counter(stats: &Value, field: &str) -> u64 {
    stats
        .get(field)
        .and_then(Value::as_str)
        .and_then(|raw| raw.parse::<u64>().ok())
        .unwrap_or(0)
}

/// Test source with canned search results and per-id statistics.
pub struct MockLiveStreamSource {
    items: Vec<LiveStreamItem>,
    stats: HashMap<String, EngagementStats>,
    fail_search: bool,
    fail_stats_for: Option<String>,
}

impl MockLiveStreamSource {
    pub fn new(items: Vec<LiveStreamItem>) -> Self {
        Self {
            items,
            stats: HashMap::new(),
            fail_search: false,
            fail_stats_for: None,
        }
    }

    pub fn with_search_failure() -> Self {
        Self {
            fail_search: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn with_stats(mut self, video_id: &str, stats: EngagementStats) -> Self {
        self.stats.insert(video_id.to_string(), stats);
        self
    }

    pub fn with_stats_failure(mut self, video_id: &str) -> Self {
        self.fail_stats_for = Some(video_id.to_string());
        self
    }
}

#[async_trait]
impl LiveStreamSource for MockLiveStreamSource {
    async fn search_live(&self) -> Result<Vec<LiveStreamItem>> {
        if self.fail_search {
            return Err(IngestError::SearchFailed(
                "search endpoint returned 403 Forbidden".to_string(),
            ));
        }
        Ok(self.items.clone())
    }

    async fn statistics(&self, video_id: &str) -> Result<Option<EngagementStats>> {
        if self.fail_stats_for.as_deref() == Some(video_id) {
            return Err(IngestError::StatsFailed {
                content_id: video_id.to_string(),
                message: "statistics endpoint returned 500 Internal Server Error".to_string(),
            });
        }
        Ok(self.stats.get(video_id).copied())
    }
}
