//! Error types for the ingestion pipeline.

use thiserror::Error;

/// Errors produced while collecting and persisting a batch.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Search request failed: {0}")]
    SearchFailed(String),

    #[error("Statistics lookup failed for {content_id}: {message}")]
    StatsFailed { content_id: String, message: String },

    #[error("No data file found under {0}")]
    MissingDataFile(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    ParquetError(#[from] parquet::errors::ParquetError),

    #[error(transparent)]
    Core(#[from] livesink_core::LivesinkError),
}
