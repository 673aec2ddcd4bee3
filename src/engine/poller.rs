//! Task status polling
//!
//! Consumes the upstream task-status event stream for one submission and
//! folds it into a [`PollResult`]. The stream is read until it closes, a
//! `[DONE]` frame arrives, every task reaches a terminal state, or the poll
//! timeout elapses; in every case whatever was accumulated is returned.

use crate::{
    Result,
    credential::Credential,
    upstream::{
        ByteStream, SseDecoder, Transport,
        wire::{StatusEvent, TaskRecord, TaskStatusRequest},
    },
};
use futures_util::StreamExt;
use std::collections::HashMap;
use std::time::Duration;

const SUCCESS_STATUS: &str = "SUCCESS";

/// Statuses that leave a task pending in intermediate updates
const IN_FLIGHT_STATUSES: &[&str] = &["", "PENDING", "PROCESSING", "RUNNING", "QUEUED", "IN_PROGRESS"];

/// Aggregate outcome of one polling run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollResult {
    /// Artifact URLs of successful tasks, deduplicated, in arrival order
    pub urls: Vec<String>,
    /// Last failure diagnostic seen, if any
    pub detail: Option<String>,
}

impl PollResult {
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Diagnostic text, empty when none was captured
    pub fn detail(&self) -> &str {
        self.detail.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TaskOutcome {
    Pending,
    Succeeded,
    Failed,
}

/// Blocks one attempt on the status stream of its tasks
#[derive(Debug, Clone)]
pub struct TaskPoller {
    poll_timeout: Duration,
}

impl TaskPoller {
    pub fn new(poll_timeout: Duration) -> Self {
        Self { poll_timeout }
    }

    /// Poll the status of `task_ids` using `credential`
    ///
    /// Fails only when the stream cannot be opened. Dropping the returned
    /// future closes the stream.
    pub async fn poll(
        &self,
        transport: &dyn Transport,
        credential: &Credential,
        task_ids: &[String],
    ) -> Result<PollResult> {
        let body = serde_json::to_string(&TaskStatusRequest { task_ids })?;
        let stream = transport.open_status_stream(credential, &body).await?;

        let mut state = PollState::new(task_ids);
        if tokio::time::timeout(self.poll_timeout, state.consume(stream))
            .await
            .is_err()
        {
            tracing::warn!(
                "Polling {} task(s) timed out after {:?}",
                task_ids.len(),
                self.poll_timeout
            );
        }

        Ok(state.into_result())
    }
}

struct PollState {
    order: Vec<String>,
    outcomes: HashMap<String, TaskOutcome>,
    urls: Vec<String>,
    detail: Option<String>,
    last_data: String,
}

impl PollState {
    fn new(task_ids: &[String]) -> Self {
        Self {
            order: task_ids.to_vec(),
            outcomes: task_ids
                .iter()
                .map(|id| (id.clone(), TaskOutcome::Pending))
                .collect(),
            urls: Vec::new(),
            detail: None,
            last_data: String::new(),
        }
    }

    async fn consume(&mut self, mut stream: ByteStream) {
        let mut decoder = SseDecoder::new();

        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    tracing::warn!("Status stream interrupted: {}", e);
                    break;
                }
            };
            for frame in decoder.push_bytes(&chunk) {
                if self.apply(&frame.data) {
                    return;
                }
            }
        }

        for frame in decoder.finish() {
            if self.apply(&frame.data) {
                return;
            }
        }
    }

    /// Apply one frame; returns true once polling should stop
    fn apply(&mut self, data: &str) -> bool {
        let data = data.trim();
        if data.is_empty() {
            return false;
        }
        if data == "[DONE]" {
            return true;
        }
        self.last_data = data.to_string();
        tracing::debug!("Task status event: {}", data);

        match serde_json::from_str::<StatusEvent>(data) {
            Ok(StatusEvent::Complete { final_status }) => {
                self.apply_snapshot(&final_status, true);
                true
            }
            Ok(StatusEvent::Update { task_status }) => {
                self.apply_snapshot(&task_status, false);
                self.all_terminal()
            }
            Ok(StatusEvent::Other) => false,
            Err(e) => {
                tracing::debug!("Skipping unparseable status event: {}", e);
                false
            }
        }
    }

    fn apply_snapshot(&mut self, snapshot: &HashMap<String, TaskRecord>, is_final: bool) {
        for task_id in &self.order {
            if self.outcomes.get(task_id) != Some(&TaskOutcome::Pending) {
                continue;
            }
            let Some(record) = snapshot.get(task_id) else {
                continue;
            };

            let outcome = match record.first_url() {
                Some(url) if record.status == SUCCESS_STATUS => {
                    if !self.urls.iter().any(|seen| seen == url) {
                        self.urls.push(url.to_string());
                    }
                    TaskOutcome::Succeeded
                }
                _ if !is_final && is_in_flight(&record.status) => TaskOutcome::Pending,
                // Success without an artifact may still get one in a later update
                _ if !is_final && record.status == SUCCESS_STATUS => TaskOutcome::Pending,
                _ => {
                    let detail = format!(
                        "task {} status: {}, error: {}",
                        task_id,
                        record.status,
                        record.error_text()
                    );
                    tracing::warn!("Task failed: {}", detail);
                    self.detail = Some(detail);
                    TaskOutcome::Failed
                }
            };
            self.outcomes.insert(task_id.clone(), outcome);
        }
    }

    fn all_terminal(&self) -> bool {
        self.outcomes
            .values()
            .all(|outcome| *outcome != TaskOutcome::Pending)
    }

    fn into_result(self) -> PollResult {
        let detail = match self.detail {
            None if self.urls.is_empty() => Some(format!(
                "no video URLs in response, last data: {}",
                self.last_data
            )),
            detail => detail,
        };
        PollResult {
            urls: self.urls,
            detail,
        }
    }
}

fn is_in_flight(status: &str) -> bool {
    IN_FLIGHT_STATUSES
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(status))
}
