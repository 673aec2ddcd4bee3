//! Supported model catalogue

use serde::{Deserialize, Serialize};

/// Video models accepted by `/v1/videos/generations`
pub const VIDEO_MODELS: &[&str] = &[
    "sora-2",
    "sora-2-pro",
    "gemini/veo3",
    "gemini/veo3/fast",
    "kling/v2.5-turbo/pro",
    "fal-ai/bytedance/seedance/v1/pro",
    "minimax/hailuo-02/standard",
    "pixverse/v5",
    "fal-ai/bytedance/seedance/v1/lite",
    "gemini/veo2",
    "wan/v2.2",
    "hunyuan",
    "vidu/start-end-to-video",
    "runway/gen4_turbo",
];

pub fn is_video_model(model: &str) -> bool {
    VIDEO_MODELS.contains(&model)
}

/// `GET /v1/models` payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelList {
    pub object: String,
    pub data: Vec<ModelCard>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelCard {
    pub id: String,
    pub object: String,
    pub owned_by: String,
}

impl ModelList {
    pub fn video_models() -> Self {
        Self {
            object: "list".to_string(),
            data: VIDEO_MODELS
                .iter()
                .map(|id| ModelCard {
                    id: id.to_string(),
                    object: "model".to_string(),
                    owned_by: "genspark".to_string(),
                })
                .collect(),
        }
    }
}
