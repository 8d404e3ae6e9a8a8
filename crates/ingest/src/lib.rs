//! Livesink batch ingestion
//!
//! Polls the video platform for currently live streams, enriches each result
//! with engagement statistics, writes the batch to object storage as Parquet,
//! derives the load manifest and COPY command, and publishes the load
//! trigger.

pub mod batch;
pub mod collector;
pub mod command;
pub mod config;
pub mod error;
pub mod manifest;
pub mod parquet;
pub mod pipeline;
pub mod youtube;

// Re-export commonly used types
pub use batch::{Batch, LiveStreamRecord};
pub use collector::{BatchCollector, StatsPolicy};
pub use config::IngestConfig;
pub use error::IngestError;
pub use pipeline::{IngestPipeline, RunReport};
pub use youtube::{
    EngagementStats, LiveStreamItem, LiveStreamSource, MockLiveStreamSource, YouTubeClient,
};

/// Result type alias for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;
