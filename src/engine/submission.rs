//! Submission body construction and task extraction

use crate::{
    Result,
    types::VideoGenerationRequest,
    upstream::{
        Transport,
        wire::{
            ContentPart, ExtraData, GeneratedContent, ImageUrl, Message, MessageContent,
            ModelConfig, SubmissionBody, SubmissionEvent, VIDEO_SESSION_TYPE,
        },
    },
    utils::image::{self, ImageInput},
};
use serde_json::{Map, Value};

/// Task handles announced by one submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmittedTasks {
    /// Upstream project created for the submission, used for cleanup
    pub project_id: Option<String>,
    pub task_ids: Vec<String>,
}

/// Turn the caller's reference image into a data URI
///
/// Runs once per generation request. A failed download is an error; an input
/// that is neither a URL, a data URI nor base64, or a download that is not an
/// image, yields `None` and the submission goes out as text only.
pub async fn resolve_reference_image(
    transport: &dyn Transport,
    request: &VideoGenerationRequest,
) -> Result<Option<String>> {
    let Some(raw) = request.image() else {
        return Ok(None);
    };

    match ImageInput::classify(raw) {
        ImageInput::Remote(url) => {
            let bytes = transport.fetch_image(url).await?;
            let uri = image::encode_data_uri(&bytes);
            if uri.is_none() {
                tracing::warn!("Reference image at {} is not a recognised image, ignoring", url);
            }
            Ok(uri)
        }
        ImageInput::DataUri(uri) => Ok(Some(uri.to_string())),
        ImageInput::Base64(payload) => Ok(Some(image::base64_to_data_uri(payload))),
        ImageInput::Unsupported => {
            tracing::warn!("Unsupported reference image format, sending prompt only");
            Ok(None)
        }
    }
}

/// Build the submission body for one attempt
pub fn build_submission(
    request: &VideoGenerationRequest,
    image: Option<&str>,
    chat_id: Option<&str>,
    recaptcha_token: Option<String>,
) -> SubmissionBody {
    let content = match image {
        Some(url) => MessageContent::Parts(vec![
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: url.to_string(),
                },
            },
            ContentPart::Text {
                text: request.prompt.clone(),
            },
        ]),
        None => MessageContent::Text(request.prompt.clone()),
    };

    let current_query_string = match chat_id.filter(|id| !id.is_empty()) {
        Some(id) => format!("id={}&type={}", id, VIDEO_SESSION_TYPE),
        None => format!("type={}", VIDEO_SESSION_TYPE),
    };

    SubmissionBody {
        kind: VIDEO_SESSION_TYPE.to_string(),
        current_query_string,
        messages: vec![Message {
            role: "user".to_string(),
            content,
        }],
        user_s_input: request.prompt.clone(),
        action_params: Map::new(),
        extra_data: ExtraData {
            model_configs: vec![ModelConfig {
                model: request.model.clone(),
                aspect_ratio: request.aspect_ratio().to_string(),
                reflection_enabled: request.auto_prompt(),
                duration: request.duration(),
            }],
            image_model_map: Map::new(),
        },
        g_recaptcha_token: recaptcha_token,
    }
}

/// Pull the project id and task ids out of a raw submission response
///
/// Lines that are not JSON events, or whose `content` is not a task listing,
/// are skipped.
pub fn extract_tasks(body: &str) -> SubmittedTasks {
    let mut submitted = SubmittedTasks::default();

    for line in body.lines() {
        let line = line.trim();
        let payload = line.strip_prefix("data:").map(str::trim_start).unwrap_or(line);
        if !payload.starts_with('{') {
            continue;
        }
        let Ok(event) = serde_json::from_str::<SubmissionEvent>(payload) else {
            continue;
        };

        if event.kind.as_deref() == Some("project_start") {
            if let Some(id) = event.id.filter(|id| !id.is_empty()) {
                submitted.project_id = Some(id);
            }
        }

        let Some(Value::String(content)) = event.content else {
            continue;
        };
        let Ok(generated) = serde_json::from_str::<GeneratedContent>(&content) else {
            continue;
        };
        for task in generated
            .generated_videos
            .into_iter()
            .chain(generated.generated_images)
        {
            if !task.task_id.is_empty() && !submitted.task_ids.contains(&task.task_id) {
                submitted.task_ids.push(task.task_id);
            }
        }
    }

    submitted
}
