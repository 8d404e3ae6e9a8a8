//! Batch records and their storage layout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// File name of the columnar data object within a batch prefix.
pub const DATA_FILE_NAME: &str = "data.parquet";
/// File name of the manifest object within a batch prefix.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";
/// File name of the rendered COPY command within a batch prefix.
pub const COMMAND_FILE_NAME: &str = "copy_command.txt";

/// One observed live stream, enriched with engagement counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveStreamRecord {
    pub content_id: String,
    pub title: String,
    pub channel_name: String,
    pub canonical_url: String,
    pub published_at: DateTime<Utc>,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    pub fetched_at: DateTime<Utc>,
}

/// One run's records, keyed by the run timestamp that names its prefix.
#[derive(Debug, Clone)]
pub struct Batch {
    pub run_at: DateTime<Utc>,
    pub records: Vec<LiveStreamRecord>,
}

impl Batch {
    pub fn new(records: Vec<LiveStreamRecord>) -> Self {
        Self {
            run_at: Utc::now(),
            records,
        }
    }

    /// Storage prefix for this run: `<base>/batch_<UTC timestamp>/`.
    pub fn prefix(&self, base: &str) -> String {
        format!(
            "{}/batch_{}/",
            base,
            self.run_at.format("%Y-%m-%d-%H-%M-%S")
        )
    }

    pub fn data_key(&self, base: &str) -> String {
        format!("{}{}", self.prefix(base), DATA_FILE_NAME)
    }

    pub fn manifest_key(&self, base: &str) -> String {
        format!("{}{}", self.prefix(base), MANIFEST_FILE_NAME)
    }

    pub fn command_key(&self, base: &str) -> String {
        format!("{}{}", self.prefix(base), COMMAND_FILE_NAME)
    }
}

/// Canonical watch URL for a video id.
pub fn canonical_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}
