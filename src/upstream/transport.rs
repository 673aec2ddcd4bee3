//! Transport abstraction for upstream calls
//!
//! Everything the engine needs from the network goes through [`Transport`],
//! so the retry loop and poller can be driven by a scripted implementation in
//! tests.

use crate::{Result, credential::Credential};
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;

/// Raw body of a long-lived upstream response. Dropping it closes the
/// underlying connection.
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// Upstream operations performed on behalf of one cookie
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Post a serialized submission body and return the raw response text
    async fn submit(&self, credential: &Credential, body: &str) -> Result<String>;

    /// Open the task-status event stream for a serialized status request
    async fn open_status_stream(&self, credential: &Credential, body: &str) -> Result<ByteStream>;

    /// Delete an upstream project created by a submission
    async fn delete_project(&self, credential: &Credential, project_id: &str) -> Result<()>;

    /// Recaptcha token to attach to the next submission, if a bypass proxy
    /// is configured and answered
    async fn recaptcha_token(&self, credential: &Credential) -> Result<Option<String>>;

    /// Download a reference image
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>>;
}
