//! Error types for VaultDesk
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for VaultDesk operations
///
/// This enum encompasses all possible errors that can occur while
/// serving requests: configuration loading, session authentication,
/// conversation persistence, and vault indexing.
#[derive(Error, Debug)]
pub enum VaultdeskError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request validation errors (missing or malformed required fields)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced conversation or vault file does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Referential integrity violations (duplicate id, orphan message)
    #[error("Integrity error: {0}")]
    Integrity(String),

    /// Authentication errors (bad secret, invalid or expired session token)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Conversation storage errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Vault errors (unreadable root, traversal outside the vault)
    #[error("Vault error: {0}")]
    Vault(String),

    /// External workflow dispatcher errors
    #[error("Workflow dispatch error: {0}")]
    Workflow(String),

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
}

/// Result type alias for VaultDesk operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
