//! Response type definitions
//!
//! Defines the OpenAI-style success payload, the error envelope and the
//! health-check response.

use serde::{Deserialize, Serialize};

/// Successful video generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoGenerationResponse {
    /// Unix timestamp (seconds)
    pub created: i64,
    pub data: Vec<VideoData>,
}

/// One generated artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoData {
    pub url: String,
    pub revised_prompt: String,
}

impl VideoGenerationResponse {
    pub fn new(created: i64, data: Vec<VideoData>) -> Self {
        Self { created, data }
    }

    /// Artifact URLs in response order
    pub fn urls(&self) -> Vec<&str> {
        self.data.iter().map(|item| item.url.as_str()).collect()
    }
}

/// OpenAI-style error envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub code: String,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(message: impl Into<String>, kind: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                message: message.into(),
                kind: kind.into(),
                code: code.into(),
            },
        }
    }

    /// Envelope for a rejected request (HTTP 400)
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(message, "invalid_request_error", "400")
    }

    /// Envelope for a pipeline failure (HTTP 500)
    pub fn request_error(message: impl Into<String>) -> Self {
        Self::new(message, "request_error", "500")
    }
}

/// Ping response for health checks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingResponse {
    /// Server uptime in seconds
    pub server_uptime: u64,

    /// Server version
    pub version: String,

    /// Configured cookies
    pub credentials: usize,

    /// Cookies currently cooling down
    pub cooling_down: usize,
}

impl PingResponse {
    /// Create a new ping response
    pub fn new(server_uptime: u64, version: impl Into<String>) -> Self {
        Self {
            server_uptime,
            version: version.into(),
            credentials: 0,
            cooling_down: 0,
        }
    }

    /// Attach pool statistics
    pub fn with_pool(mut self, credentials: usize, cooling_down: usize) -> Self {
        self.credentials = credentials;
        self.cooling_down = cooling_down;
        self
    }
}
