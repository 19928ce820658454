//! Custom error types for tvremote.
//!
//! This module provides structured error types using `thiserror` for every
//! failure the remote client can surface to its caller.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Main error type for tvremote operations.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// The key name is not in the configured allow-list.
    #[error("invalid key '{key}'")]
    InvalidCommand { key: String },

    /// Transport-level failure while connecting, reading or writing.
    #[error("could not connect to '{url}': {reason}")]
    Connection { url: String, reason: String },

    /// The TV answered with something other than the handshake event.
    #[error("unknown message received: {0}")]
    UnexpectedMessage(String),

    /// A connection stage did not finish in time.
    #[error("timed out after {timeout:?} while {stage}")]
    Timeout {
        stage: &'static str,
        timeout: Duration,
    },

    /// The dispatch was aborted through a cancel handle.
    #[error("dispatch cancelled")]
    Cancelled,

    /// Configuration validation error.
    #[error("configuration error: {0}")]
    ConfigValidation(String),

    /// Error reading or parsing configuration file.
    #[error("failed to load config from '{path}': {reason}")]
    ConfigLoad { path: String, reason: String },

    /// Error writing configuration file.
    #[error("failed to save config to '{path}': {reason}")]
    ConfigSave { path: String, reason: String },

    /// Error parsing duration string.
    #[error("invalid duration '{value}': {reason}")]
    InvalidDuration { value: String, reason: String },

    /// The durable token store could not be read or written.
    #[error("token store '{path}': {reason}")]
    TokenStore { path: String, reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for tvremote operations.
pub type Result<T> = std::result::Result<T, RemoteError>;

impl RemoteError {
    /// Create a new InvalidCommand error.
    pub fn invalid_command(key: impl Into<String>) -> Self {
        Self::InvalidCommand { key: key.into() }
    }

    /// Create a new Connection error.
    pub fn connection(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Connection {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create a new UnexpectedMessage error.
    pub fn unexpected_message(payload: impl Into<String>) -> Self {
        Self::UnexpectedMessage(payload.into())
    }

    /// Create a new Timeout error.
    pub fn timeout(stage: &'static str, timeout: Duration) -> Self {
        Self::Timeout { stage, timeout }
    }

    /// Create a new ConfigValidation error.
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation(message.into())
    }

    /// Create a new ConfigLoad error.
    pub fn config_load(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a new ConfigSave error.
    pub fn config_save(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigSave {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a new InvalidDuration error.
    pub fn invalid_duration(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDuration {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a new TokenStore error.
    pub fn token_store(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TokenStore {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
