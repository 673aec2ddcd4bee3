//! Error type definitions
//!
//! Defines the main error types used throughout the adapter. Variants follow
//! how the retry loop treats them: rejections and missing artifacts are
//! absorbed while other credentials remain, everything else is terminal.

use crate::engine::classify::{Fatal, Rejection};
use thiserror::Error;

/// Main error type for the adapter
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP server errors
    #[error("Server error: {0}")]
    Server(String),

    /// Request rejected before any upstream call (unknown model, empty prompt)
    #[error("{0}")]
    Validation(String),

    /// Pool is empty or every credential is cooling down
    #[error("No valid cookies available")]
    NoEligibleCredential,

    /// Every credential in the retry sequence has been tried
    #[error("{}", exhausted_message(.last_error))]
    CredentialsExhausted { last_error: Option<String> },

    /// Upstream request or event stream could not be established
    #[error("Transport error: {0}")]
    Transport(String),

    /// Credential-specific refusal (rate limited, free tier used up, logged out)
    #[error("{rejection}: {detail}")]
    BackendRejection { rejection: Rejection, detail: String },

    /// Upstream failure unrelated to the credential
    #[error("{fatal}: {detail}")]
    BackendFatal { fatal: Fatal, detail: String },

    /// Tasks finished without a usable artifact URL
    #[error("video generation failed: {0}")]
    NoArtifact(String),

    /// Best-effort project deletion failed
    #[error("Cleanup error: {0}")]
    Cleanup(String),

    /// Network/HTTP client errors
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors
    #[error("Internal error: {0}")]
    Internal(String),
}

fn exhausted_message(last_error: &Option<String>) -> String {
    match last_error {
        Some(last) => format!("all attempts failed: {}", last),
        None => "all cookies are temporarily unavailable".to_string(),
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new server error
    pub fn server(msg: impl Into<String>) -> Self {
        Self::Server(msg.into())
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a backend rejection carrying the raw upstream body
    pub fn rejection(rejection: Rejection, detail: impl Into<String>) -> Self {
        Self::BackendRejection {
            rejection,
            detail: detail.into(),
        }
    }

    /// Create a fatal backend error carrying the raw upstream body
    pub fn fatal(fatal: Fatal, detail: impl Into<String>) -> Self {
        Self::BackendFatal {
            fatal,
            detail: detail.into(),
        }
    }

    /// Create a missing-artifact error
    pub fn no_artifact(detail: impl Into<String>) -> Self {
        Self::NoArtifact(detail.into())
    }

    /// Create a cleanup error
    pub fn cleanup(msg: impl Into<String>) -> Self {
        Self::Cleanup(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the caller is at fault (HTTP 400) rather than the pipeline (HTTP 500)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
