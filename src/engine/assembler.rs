//! Result assembly and best-effort project cleanup

use crate::{
    credential::Credential,
    types::{VideoData, VideoGenerationResponse},
    upstream::Transport,
};
use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Maps poll results to the external response shape
#[derive(Debug, Clone)]
pub struct ResultAssembler {
    auto_delete: bool,
}

impl ResultAssembler {
    pub fn new(auto_delete: bool) -> Self {
        Self { auto_delete }
    }

    /// Pair every artifact URL with the caller's prompt
    pub fn assemble(&self, urls: &[String], prompt: &str) -> VideoGenerationResponse {
        VideoGenerationResponse::new(
            Utc::now().timestamp(),
            urls.iter()
                .map(|url| VideoData {
                    url: url.clone(),
                    revised_prompt: prompt.to_string(),
                })
                .collect(),
        )
    }

    /// Schedule deletion of the upstream project
    ///
    /// Runs on a detached task so the caller's response never waits on it and
    /// cancelling the caller does not abort it. Failures are only logged.
    /// Returns `None` when auto-deletion is off or there is nothing to delete.
    pub fn schedule_cleanup(
        &self,
        transport: Arc<dyn Transport>,
        credential: Credential,
        project_id: Option<String>,
    ) -> Option<JoinHandle<()>> {
        if !self.auto_delete {
            return None;
        }
        let project_id = project_id.filter(|id| !id.is_empty())?;

        Some(tokio::spawn(async move {
            match transport.delete_project(&credential, &project_id).await {
                Ok(()) => tracing::debug!("Deleted upstream project {}", project_id),
                Err(e) => tracing::warn!("Failed to delete upstream project {}: {}", project_id, e),
            }
        }))
    }
}
