//! Livesink load executor
//!
//! Consumes load triggers from the trigger topic, fetches the referenced
//! COPY command from object storage, submits it to the warehouse's
//! asynchronous statement API, and reports the outcome on the outcome
//! topic.

pub mod config;
pub mod error;
pub mod executor;
pub mod trigger;

// Re-export commonly used types
pub use config::LoaderConfig;
pub use error::LoaderError;
pub use executor::{
    LoadExecutor, LoadOutcome, OUTCOME_SUBJECT_FAILURE, OUTCOME_SUBJECT_SUCCESS,
};
pub use trigger::parse_trigger;

/// Result type alias for loader operations
pub type Result<T> = std::result::Result<T, LoaderError>;
