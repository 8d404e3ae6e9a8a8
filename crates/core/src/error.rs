//! Error types shared across the Livesink crates.

use thiserror::Error;

/// Errors produced by the shared Livesink components.
#[derive(Debug, Error)]
pub enum LivesinkError {
    #[error("Configuration error: {message}")]
    ConfigurationError {
        message: String,
        key: Option<String>,
    },

    #[error("Invalid storage URI: {0}")]
    InvalidUri(String),

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Publish error: {0}")]
    PublishError(String),

    #[error("Warehouse error: {0}")]
    WarehouseError(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
