//! Upstream wire shapes
//!
//! Typed bodies for the submission and task-status endpoints. Outbound bodies
//! are plain serde structs; inbound events are parsed leniently and any frame
//! that does not fit is skipped by the caller.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Request type for video generation sessions
pub const VIDEO_SESSION_TYPE: &str = "COPILOT_MOA_VIDEO";

/// Body posted to the submission endpoint
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionBody {
    #[serde(rename = "type")]
    pub kind: String,
    pub current_query_string: String,
    pub messages: Vec<Message>,
    pub user_s_input: String,
    pub action_params: Map<String, Value>,
    pub extra_data: ExtraData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub g_recaptcha_token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtraData {
    pub model_configs: Vec<ModelConfig>,
    #[serde(rename = "imageModelMap")]
    pub image_model_map: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelConfig {
    pub model: String,
    pub aspect_ratio: String,
    pub reflection_enabled: bool,
    pub duration: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub role: String,
    pub content: MessageContent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    ImageUrl { image_url: ImageUrl },
    Text { text: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Body posted to the task-status stream endpoint
#[derive(Debug, Clone, Serialize)]
pub struct TaskStatusRequest<'a> {
    pub task_ids: &'a [String],
}

/// One line of the submission response stream
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionEvent {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    /// JSON-encoded payload; only string contents are inspected
    #[serde(default)]
    pub content: Option<Value>,
}

/// Decoded `content` of a submission event that announces generation tasks
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratedContent {
    #[serde(default)]
    pub generated_videos: Vec<GeneratedTask>,
    #[serde(default)]
    pub generated_images: Vec<GeneratedTask>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedTask {
    #[serde(default)]
    pub task_id: String,
}

/// Event on the task-status stream
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum StatusEvent {
    /// Terminal snapshot: every task is final
    #[serde(rename = "TASKS_STATUS_COMPLETE")]
    Complete {
        #[serde(default, deserialize_with = "lenient_snapshot")]
        final_status: HashMap<String, TaskRecord>,
    },
    /// Intermediate snapshot for some or all tasks
    #[serde(rename = "TASKS_STATUS_UPDATE")]
    Update {
        #[serde(default, deserialize_with = "lenient_snapshot")]
        task_status: HashMap<String, TaskRecord>,
    },
    #[serde(other)]
    Other,
}

/// Decode a snapshot map one record at a time
///
/// A malformed record only degrades that record; it never rejects the event.
fn lenient_snapshot<'de, D>(deserializer: D) -> Result<HashMap<String, TaskRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let snapshot = match Value::deserialize(deserializer)? {
        Value::Object(map) => map,
        _ => return Ok(HashMap::new()),
    };
    Ok(snapshot
        .into_iter()
        .map(|(task_id, record)| (task_id, TaskRecord::from_value(&record)))
        .collect())
}

/// Per-task entry of a status snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskRecord {
    pub status: String,
    /// String entries of `video_urls`, then of `image_urls`
    pub urls: Vec<String>,
    pub error_message: Option<String>,
    pub message: Option<String>,
}

impl TaskRecord {
    /// Build a record from any JSON value, keeping whatever fields make sense
    pub fn from_value(value: &Value) -> Self {
        let Some(record) = value.as_object() else {
            return Self::default();
        };

        let urls = ["video_urls", "image_urls"]
            .iter()
            .filter_map(|key| record.get(*key).and_then(Value::as_array))
            .flatten()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();

        Self {
            status: record
                .get("status")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            urls,
            error_message: record.get("error_message").and_then(text_of),
            message: record.get("message").and_then(text_of),
        }
    }

    /// First artifact URL, if any
    pub fn first_url(&self) -> Option<&str> {
        self.urls
            .iter()
            .find(|url| !url.is_empty())
            .map(String::as_str)
    }

    /// `error_message`, falling back to `message`
    pub fn error_text(&self) -> &str {
        self.error_message
            .as_deref()
            .filter(|msg| !msg.is_empty())
            .or(self.message.as_deref())
            .unwrap_or("")
    }
}

/// Render a diagnostic field as text; structured values keep their JSON form
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Reply from the recaptcha-bypass proxy
#[derive(Debug, Clone, Deserialize)]
pub struct RecaptchaReply {
    pub code: i64,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub message: String,
}
