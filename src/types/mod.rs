//! Type definitions for the inbound API
//!
//! This module contains the OpenAI-style request and response shapes.

pub mod models;
pub mod request;
pub mod response;
pub mod serde_helpers;

pub use models::{ModelList, VIDEO_MODELS, is_video_model};
pub use request::VideoGenerationRequest;
pub use response::{ErrorResponse, PingResponse, VideoData, VideoGenerationResponse};
