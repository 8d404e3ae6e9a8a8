//! Ingest job configuration.

use livesink_core::{
    optional_env, parse_env_var, require_env, validate_url, ConfigLoader, LivesinkError,
};

use crate::collector::StatsPolicy;

/// Configuration for one ingestion run.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// API key for the video platform.
    pub youtube_api_key: String,
    /// Bucket receiving batch artifacts.
    pub storage_bucket: String,
    /// Key prefix under which batch directories are created.
    pub storage_prefix: String,
    /// Local root directory for the filesystem store backend.
    pub storage_root: String,
    /// Role the warehouse assumes to read from storage.
    pub iam_role: String,
    /// Warehouse table the COPY command targets.
    pub load_table: String,
    /// Topic receiving the load trigger.
    pub trigger_topic: String,
    pub redis_url: String,
    /// Handling of per-item statistics failures.
    pub stats_policy: StatsPolicy,
}

impl ConfigLoader for IngestConfig {
    fn from_env() -> Result<Self, LivesinkError> {
        Ok(Self {
            youtube_api_key: require_env("LIVESINK_YOUTUBE_API_KEY", "YOUTUBE_API_KEY")?,
            storage_bucket: require_env("LIVESINK_STORAGE_BUCKET", "S3_BUCKET")?,
            storage_prefix: optional_env("LIVESINK_STORAGE_PREFIX", "S3_PREFIX", "live_data"),
            storage_root: optional_env("LIVESINK_STORAGE_ROOT", "STORAGE_ROOT", "./data"),
            iam_role: require_env("LIVESINK_WAREHOUSE_IAM_ROLE", "IAM_ROLE")?,
            load_table: optional_env("LIVESINK_LOAD_TABLE", "LOAD_TABLE", "live_streams"),
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
            stats_policy: parse_env_var("LIVESINK_STATS_POLICY", StatsPolicy::default())?,
        })
    }

    fn validate(&self) -> Result<(), LivesinkError> {
        validate_url(&self.redis_url, "LIVESINK_REDIS_URL")?;
        if self.storage_prefix.is_empty() || self.storage_prefix.ends_with('/') {
            return Err(LivesinkError::ConfigurationError {
                message: "storage prefix must be non-empty and must not end with '/'".to_string(),
                key: Some("LIVESINK_STORAGE_PREFIX".to_string()),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // from_env reads process-global state; serialize the tests touching it.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ALL_KEYS: &[&str] = &[
        "LIVESINK_YOUTUBE_API_KEY",
        "YOUTUBE_API_KEY",
        "LIVESINK_STORAGE_BUCKET",
        "S3_BUCKET",
        "LIVESINK_STORAGE_PREFIX",
        "S3_PREFIX",
        "LIVESINK_STORAGE_ROOT",
        "STORAGE_ROOT",
        "LIVESINK_WAREHOUSE_IAM_ROLE",
        "IAM_ROLE",
        "LIVESINK_LOAD_TABLE",
        "LOAD_TABLE",
        "LIVESINK_TRIGGER_TOPIC",
        "TRIGGER_TOPIC",
        "LIVESINK_REDIS_URL",
        "REDIS_URL",
        "LIVESINK_STATS_POLICY",
    ];

    fn clear_all() {
        for key in ALL_KEYS {
            std::env::remove_var(key);
        }
    }

    fn set_required() {
        std::env::set_var("LIVESINK_YOUTUBE_API_KEY", "test-key");
        std::env::set_var("LIVESINK_STORAGE_BUCKET", "test-bucket");
        std::env::set_var("LIVESINK_WAREHOUSE_IAM_ROLE", "arn:aws:iam::1:role/r");
    }

    #[test]
    fn from_env_applies_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all();
        set_required();

        let config = IngestConfig::from_env().unwrap();
        assert_eq!(config.youtube_api_key, "test-key");
        assert_eq!(config.storage_bucket, "test-bucket");
        assert_eq!(config.storage_prefix, "live_data");
        assert_eq!(config.load_table, "live_streams");
        assert_eq!(config.trigger_topic, "livesink.load.trigger");
        assert_eq!(config.stats_policy, StatsPolicy::Abort);
        assert!(config.validate().is_ok());

        clear_all();
    }

    #[test]
    fn from_env_requires_the_api_key() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all();
        std::env::set_var("LIVESINK_STORAGE_BUCKET", "test-bucket");
        std::env::set_var("LIVESINK_WAREHOUSE_IAM_ROLE", "arn:aws:iam::1:role/r");

        let err = IngestConfig::from_env().unwrap_err();
        match err {
            LivesinkError::ConfigurationError { key, .. } => {
                assert_eq!(key.as_deref(), Some("LIVESINK_YOUTUBE_API_KEY"));
            }
            other => panic!("unexpected error: {:?}", other),
        }

        clear_all();
    }

    #[test]
    fn from_env_reads_zero_fill_policy() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all();
        set_required();
        std::env::set_var("LIVESINK_STATS_POLICY", "zero-fill");

        let config = IngestConfig::from_env().unwrap();
        assert_eq!(config.stats_policy, StatsPolicy::ZeroFill);

        clear_all();
    }

    #[test]
    fn from_env_rejects_unknown_policy() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all();
        set_required();
        std::env::set_var("LIVESINK_STATS_POLICY", "best-effort");

        assert!(IngestConfig::from_env().is_err());

        clear_all();
    }

    #[test]
    fn validate_rejects_trailing_slash_prefix() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all();
        set_required();
        std::env::set_var("LIVESINK_STORAGE_PREFIX", "live_data/");

        let config = IngestConfig::from_env().unwrap();
        assert!(config.validate().is_err());

        clear_all();
    }
}
