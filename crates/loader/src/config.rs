//! Loader service configuration.

use livesink_core::{optional_env, require_env, validate_url, ConfigLoader, LivesinkError};

/// Configuration for the load executor service.
///
/// The four warehouse/storage/topic settings are mandatory; the service
/// refuses to start without them.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Warehouse workgroup statements are submitted to.
    pub workgroup: String,
    /// Warehouse database statements run against.
    pub database: String,
    /// Bucket COPY commands are fetched from.
    pub source_bucket: String,
    /// Topic receiving load outcomes.
    pub outcome_topic: String,
    /// Topic delivering load triggers.
    pub trigger_topic: String,
    pub redis_url: String,
    /// Base URL of the warehouse statement API.
    pub warehouse_api_url: String,
    /// Local root directory for the filesystem store backend.
    pub storage_root: String,
}

impl ConfigLoader for LoaderConfig {
    fn from_env() -> Result<Self, LivesinkError> {
        Ok(Self {
            workgroup: require_env("LIVESINK_WAREHOUSE_WORKGROUP", "WAREHOUSE_WORKGROUP")?,
            database: require_env("LIVESINK_WAREHOUSE_DATABASE", "WAREHOUSE_DATABASE")?,
            source_bucket: require_env("LIVESINK_SOURCE_BUCKET", "S3_BUCKET")?,
            outcome_topic: require_env("LIVESINK_OUTCOME_TOPIC", "OUTCOME_TOPIC")?,
            trigger_topic: optional_env(
                "LIVESINK_TRIGGER_TOPIC",
                "TRIGGER_TOPIC",
                "livesink.load.trigger",
            ),
            redis_url: optional_env(
                "LIVESINK_REDIS_URL",
                "REDIS_URL",
                "redis://localhost:6379/0",
            ),
            warehouse_api_url: optional_env(
                "LIVESINK_WAREHOUSE_API_URL",
                "WAREHOUSE_API_URL",
                "http://localhost:8191",
            ),
            storage_root: optional_env("LIVESINK_STORAGE_ROOT", "STORAGE_ROOT", "./data"),
        })
    }

    fn validate(&self) -> Result<(), LivesinkError> {
        validate_url(&self.redis_url, "LIVESINK_REDIS_URL")?;
        validate_url(&self.warehouse_api_url, "LIVESINK_WAREHOUSE_API_URL")?;
        Ok(())
    }
}
