//! Shared foundation for the Livesink pipeline
//!
//! This crate provides the pieces both pipeline stages depend on:
//! - Error types (`error`)
//! - Environment-driven configuration (`config`)
//! - Bucket-scoped object storage (`storage`)
//! - Topic publishing for the pub/sub handoff (`notify`)
//! - Warehouse statement execution (`warehouse`)

pub mod config;
pub mod error;
pub mod notify;
pub mod storage;
pub mod warehouse;

// Re-export commonly used types
pub use config::{
    load_dotenv, optional_env, parse_env_var, require_env, validate_url, ConfigLoader,
};
pub use error::LivesinkError;
pub use notify::{
    MemoryTopicPublisher, NotificationEnvelope, NotificationRecord, RedisTopicPublisher,
    TopicPublisher,
};
pub use storage::{FsObjectStore, MemoryObjectStore, ObjectMeta, ObjectStore, StorageUri};
pub use warehouse::{
    HttpWarehouseClient, MockStatementExecutor, StatementExecution, StatementExecutor,
};

/// Result type alias for Livesink operations
pub type Result<T> = std::result::Result<T, LivesinkError>;
