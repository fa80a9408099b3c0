//! Error types for autosearch
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for autosearch operations
///
/// This enum encompasses all possible errors that can occur during
/// configuration loading, search requests, event-stream decoding,
/// and state persistence.
#[derive(Error, Debug)]
pub enum AutosearchError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Search API errors (request construction, non-success status)
    #[error("API error: {0}")]
    Api(String),

    /// Event-stream protocol errors (transport failure mid-stream)
    #[error("Stream error: {0}")]
    Stream(String),

    /// Missing or incomplete runtime LLM credentials
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    /// Snapshot storage errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type alias for autosearch operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
