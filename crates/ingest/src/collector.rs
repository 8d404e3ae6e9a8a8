//! Batch collection: one search call plus one statistics call per item.

use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;

use crate::batch::{canonical_url, Batch, LiveStreamRecord};
use crate::youtube::{EngagementStats, LiveStreamSource};
use crate::Result;

/// What to do when a statistics lookup fails for one item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatsPolicy {
    /// Fail the whole run.
    #[default]
    Abort,
    /// Log the failure and record zeroed counters for the item.
    ZeroFill,
}

impl FromStr for StatsPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "abort" => Ok(StatsPolicy::Abort),
            "zero-fill" => Ok(StatsPolicy::ZeroFill),
            other => Err(format!(
                "expected \"abort\" or \"zero-fill\", got \"{}\"",
                other
            )),
        }
    }
}

/// Folds search results and per-item statistics into a batch of records.
pub struct BatchCollector {
    source: Arc<dyn LiveStreamSource>,
    policy: StatsPolicy,
}

impl BatchCollector {
    pub fn new(source: Arc<dyn LiveStreamSource>, policy: StatsPolicy) -> Self {
        Self { source, policy }
    }

    /// Runs one collection pass. A search failure aborts the run. A
    /// statistics failure is handled per the configured policy; an item the
    /// statistics endpoint knows nothing about gets zeroed counters either
    /// way.
    pub async fn collect(&self) -> Result<Batch> {
        let items = self.source.search_live().await?;
        tracing::info!(count = items.len(), "search returned live streams");

        let mut records = Vec::with_capacity(items.len());
        for item in items {
            let stats = match self.source.statistics(&item.video_id).await {
                Ok(Some(stats)) => stats,
                Ok(None) => EngagementStats::default(),
                Err(e) => match self.policy {
                    StatsPolicy::Abort => return Err(e),
                    StatsPolicy::ZeroFill => {
                        tracing::warn!(
                            video_id = %item.video_id,
                            error = %e,
                            "statistics lookup failed, zero-filling counters"
                        );
                        EngagementStats::default()
                    }
                },
            };

            records.push(LiveStreamRecord {
                content_id: item.video_id.clone(),
                title: item.title,
                channel_name: item.channel_title,
                canonical_url: canonical_url(&item.video_id),
                published_at: item.published_at,
                view_count: stats.view_count,
                like_count: stats.like_count,
                comment_count: stats.comment_count,
                fetched_at: Utc::now(),
            });
        }

        Ok(Batch::new(records))
    }
}
