//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

/// Test helper functions
pub mod helpers {
    use async_trait::async_trait;
    use bytes::Bytes;
    use futures_util::{StreamExt, stream};
    use genspark2api::{
        Credential, Error, Result, Settings, Transport, upstream::ByteStream,
    };
    use serde_json::{Map, Value, json};
    use std::collections::VecDeque;
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    };

    pub const RATE_LIMIT_REPLY: &str = "{\"status\":-1,\"message\":\"Rate limit exceeded, slow down\"}";
    pub const FREE_TIER_REPLY: &str = "{\"status\":-1,\"message\":\"You have reached your free usage limit\"}";
    pub const NOT_LOGIN_REPLY: &str = "{\"status\":-5,\"message\":\"not login\"}";
    pub const SERVER_ERROR_REPLY: &str =
        "{\"status\":-1,\"message\":\"An error occurred with the current request, please try again\"}";

    /// Sets its flag when dropped
    #[derive(Debug)]
    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[derive(Debug)]
    enum ScriptedStream {
        Chunks(Vec<String>),
        /// Never yields; flags when the consumer drops it
        Hanging(DropFlag),
    }

    /// Transport that answers from queued scripts and records every call
    #[derive(Debug, Default)]
    pub struct ScriptedTransport {
        submit_replies: Mutex<VecDeque<String>>,
        status_streams: Mutex<VecDeque<ScriptedStream>>,
        opened_streams: AtomicUsize,
        image: Mutex<Option<Vec<u8>>>,
        submits: Mutex<Vec<(Credential, String)>>,
        deletes: Mutex<Vec<(Credential, String)>>,
    }

    impl ScriptedTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue the body returned by the next submission
        pub fn reply(self, body: impl Into<String>) -> Self {
            self.submit_replies.lock().unwrap().push_back(body.into());
            self
        }

        /// Queue the chunks served by the next status stream
        pub fn stream(self, chunks: Vec<String>) -> Self {
            self.status_streams
                .lock()
                .unwrap()
                .push_back(ScriptedStream::Chunks(chunks));
            self
        }

        /// Queue a status stream that never yields; `closed` is set once it is dropped
        pub fn hanging_stream(self, closed: Arc<AtomicBool>) -> Self {
            self.status_streams
                .lock()
                .unwrap()
                .push_back(ScriptedStream::Hanging(DropFlag(closed)));
            self
        }

        pub fn opened_streams(&self) -> usize {
            self.opened_streams.load(Ordering::SeqCst)
        }

        /// Bytes served for any reference image download
        pub fn image(self, bytes: Vec<u8>) -> Self {
            *self.image.lock().unwrap() = Some(bytes);
            self
        }

        pub fn submitted_credentials(&self) -> Vec<Credential> {
            self.submits
                .lock()
                .unwrap()
                .iter()
                .map(|(credential, _)| credential.clone())
                .collect()
        }

        pub fn submitted_bodies(&self) -> Vec<String> {
            self.submits
                .lock()
                .unwrap()
                .iter()
                .map(|(_, body)| body.clone())
                .collect()
        }

        pub fn submit_count(&self) -> usize {
            self.submits.lock().unwrap().len()
        }

        pub fn deleted_projects(&self) -> Vec<String> {
            self.deletes
                .lock()
                .unwrap()
                .iter()
                .map(|(_, project)| project.clone())
                .collect()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn submit(&self, credential: &Credential, body: &str) -> Result<String> {
            self.submits
                .lock()
                .unwrap()
                .push((credential.clone(), body.to_string()));
            self.submit_replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| Error::transport("no scripted submission reply"))
        }

        async fn open_status_stream(&self, _: &Credential, _: &str) -> Result<ByteStream> {
            let script = self
                .status_streams
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| Error::transport("no scripted status stream"))?;
            self.opened_streams.fetch_add(1, Ordering::SeqCst);
            match script {
                ScriptedStream::Chunks(chunks) => Ok(stream::iter(
                    chunks.into_iter().map(|chunk| Ok(Bytes::from(chunk))),
                )
                .boxed()),
                ScriptedStream::Hanging(flag) => Ok(stream::pending::<Result<Bytes>>()
                    .map(move |item| {
                        let _held = &flag;
                        item
                    })
                    .boxed()),
            }
        }

        async fn delete_project(&self, credential: &Credential, project_id: &str) -> Result<()> {
            self.deletes
                .lock()
                .unwrap()
                .push((credential.clone(), project_id.to_string()));
            Ok(())
        }

        async fn recaptcha_token(&self, _: &Credential) -> Result<Option<String>> {
            Ok(None)
        }

        async fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
            self.image
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| Error::transport(format!("failed to fetch image {}", url)))
        }
    }

    /// Settings with the given cookie pool
    pub fn create_test_settings(cookies: &[&str]) -> Settings {
        let mut settings = Settings::default();
        settings.credentials.cookies = cookies.iter().map(|c| c.to_string()).collect();
        settings
    }

    /// Submission reply announcing `task_ids` under `project_id`
    pub fn task_reply(project_id: &str, task_ids: &[&str]) -> String {
        let tasks: Vec<_> = task_ids.iter().map(|id| json!({ "task_id": id })).collect();
        let content = json!({ "generated_videos": tasks }).to_string();
        format!(
            "data: {}\n\ndata: {}\n\n",
            json!({ "type": "project_start", "id": project_id }),
            json!({ "type": "message_result", "content": content })
        )
    }

    fn snapshot(task_id: &str, record: Value) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(task_id.to_string(), record);
        map
    }

    /// Status stream whose final snapshot reports `task_id` as successful
    pub fn success_stream(task_id: &str, url: &str) -> Vec<String> {
        vec![
            format!(
                "data: {}\n\n",
                json!({
                    "type": "TASKS_STATUS_UPDATE",
                    "task_status": snapshot(task_id, json!({ "status": "PENDING" }))
                })
            ),
            format!(
                "data: {}\n\n",
                json!({
                    "type": "TASKS_STATUS_COMPLETE",
                    "final_status": snapshot(task_id, json!({ "status": "SUCCESS", "video_urls": [url] }))
                })
            ),
        ]
    }

    /// Status stream whose final snapshot reports `task_id` as failed
    pub fn failure_stream(task_id: &str, message: &str) -> Vec<String> {
        vec![format!(
            "data: {}\n\n",
            json!({
                "type": "TASKS_STATUS_COMPLETE",
                "final_status": snapshot(task_id, json!({ "status": "FAILED", "error_message": message }))
            })
        )]
    }
}
