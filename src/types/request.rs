//! Request type definitions
//!
//! Defines the structure for OpenAI-style video generation requests.

use super::serde_helpers::{deserialize_flexible_bool, deserialize_flexible_u32};
use serde::{Deserialize, Serialize};

/// Aspect ratio used when the request omits one
pub const DEFAULT_ASPECT_RATIO: &str = "16:9";

/// Clip length in seconds used when the request omits one
pub const DEFAULT_DURATION: u32 = 5;

/// Request for video generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoGenerationRequest {
    /// Upstream model identifier (e.g. `sora-2`)
    pub model: String,

    /// Text prompt
    #[serde(default)]
    pub prompt: String,

    /// Reference image: an http(s) URL, a data URI or bare base64
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Output aspect ratio such as `16:9`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,

    /// Clip length in seconds
    #[serde(
        default,
        deserialize_with = "deserialize_flexible_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<u32>,

    /// Let the upstream rewrite the prompt before generating
    #[serde(
        default,
        deserialize_with = "deserialize_flexible_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub auto_prompt: Option<bool>,
}

impl VideoGenerationRequest {
    /// Create a request with the required fields
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            image: None,
            aspect_ratio: None,
            duration: None,
            auto_prompt: None,
        }
    }

    /// Set reference image
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Set aspect ratio
    pub fn with_aspect_ratio(mut self, aspect_ratio: impl Into<String>) -> Self {
        self.aspect_ratio = Some(aspect_ratio.into());
        self
    }

    /// Set duration in seconds
    pub fn with_duration(mut self, duration: u32) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Set auto-prompt flag
    pub fn with_auto_prompt(mut self, auto_prompt: bool) -> Self {
        self.auto_prompt = Some(auto_prompt);
        self
    }

    pub fn aspect_ratio(&self) -> &str {
        self.aspect_ratio
            .as_deref()
            .filter(|ratio| !ratio.trim().is_empty())
            .unwrap_or(DEFAULT_ASPECT_RATIO)
    }

    pub fn duration(&self) -> u32 {
        self.duration.unwrap_or(DEFAULT_DURATION)
    }

    pub fn auto_prompt(&self) -> bool {
        self.auto_prompt.unwrap_or(false)
    }

    /// Reference image, ignoring blank values
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref().map(str::trim).filter(|image| !image.is_empty())
    }
}
