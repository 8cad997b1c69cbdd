//! Custom error types for citytime
//!
//! Failures of a time lookup are *values* (see [`crate::time::TimeError`]) and
//! never show up here. This type covers everything that can stop a turn or the
//! whole session.

use thiserror::Error;

/// Main error type for citytime operations
#[derive(Error, Debug)]
pub enum CityTimeError {
    /// No LLM credential could be found. Fatal: the session never starts.
    #[error("{0}")]
    MissingCredential(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The LLM backend answered with a non-success status or an unusable body
    #[error("LLM backend error{}: {message}", status.map(|s| format!(" ({})", s)).unwrap_or_default())]
    Backend {
        status: Option<u16>,
        message: String,
    },

    /// The model kept requesting tools past the configured limit
    #[error("Model requested tools for {0} rounds without answering")]
    ToolLoop(usize),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

/// Convenience Result type for citytime operations
pub type Result<T> = std::result::Result<T, CityTimeError>;

impl CityTimeError {
    /// Create a missing-credential error
    pub fn missing_credential(msg: impl Into<String>) -> Self {
        Self::MissingCredential(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a backend error with an optional HTTP status
    pub fn backend(status: Option<u16>, msg: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: msg.into(),
        }
    }

    /// Whether this error must end the session rather than just the turn
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MissingCredential(_))
    }
}
