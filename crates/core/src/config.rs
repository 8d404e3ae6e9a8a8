//! Configuration loading for Livesink services.
//!
//! Service configs implement [`ConfigLoader`] and assemble themselves from
//! environment variables. Every variable is looked up under its
//! `LIVESINK_`-prefixed name first, then under the bare name, so existing
//! deployments keep working without renaming anything.

use std::str::FromStr;

use url::Url;

use crate::error::LivesinkError;

/// Trait for loading configuration from environment variables
pub trait ConfigLoader: Sized {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if:
    /// - Required environment variables are missing
    /// - Environment variable values cannot be parsed
    fn from_env() -> Result<Self, LivesinkError>;

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if any validation check fails.
    fn validate(&self) -> Result<(), LivesinkError>;
}

/// Loads environment variables from a `.env` file if one is present.
///
/// A missing file is not an error; any other failure is logged and ignored
/// so a malformed `.env` never takes a service down.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!("Loaded environment from {}", path.display());
        }
        Err(e) => {
            if !e.not_found() {
                tracing::warn!("Failed to load .env file: {}", e);
            }
        }
    }
}

/// Reads a required variable, trying the prefixed key before the bare one.
pub fn require_env(key: &str, fallback: &str) -> Result<String, LivesinkError> {
    std::env::var(key)
        .or_else(|_| std::env::var(fallback))
        .map_err(|_| LivesinkError::ConfigurationError {
            message: format!("{} or {} must be set", key, fallback),
            key: Some(key.to_string()),
        })
}

/// Reads an optional variable, trying the prefixed key before the bare one.
pub fn optional_env(key: &str, fallback: &str, default: &str) -> String {
    std::env::var(key)
        .or_else(|_| std::env::var(fallback))
        .unwrap_or_else(|_| default.to_string())
}

/// Parses an environment variable into `T`, falling back to `default` when
/// the variable is unset.
pub fn parse_env_var<T: FromStr>(key: &str, default: T) -> Result<T, LivesinkError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value
            .parse::<T>()
            .map_err(|e| LivesinkError::ConfigurationError {
                message: format!("Invalid value for {}: {}", key, e),
                key: Some(key.to_string()),
            }),
        Err(_) => Ok(default),
    }
}

/// Validates that a configured value parses as a URL.
pub fn validate_url(value: &str, key: &str) -> Result<(), LivesinkError> {
    Url::parse(value).map_err(|e| LivesinkError::ConfigurationError {
        message: format!("Invalid {}: {}", key, e),
        key: Some(key.to_string()),
    })?;
    Ok(())
}
