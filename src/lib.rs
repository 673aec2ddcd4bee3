//! genspark2api - OpenAI-style video generation over Genspark
//!
//! A credential-rotating adapter that accepts OpenAI-style video generation
//! requests, submits them to Genspark with one of several session cookies,
//! follows the task-status event stream and answers synchronously with the
//! resulting video URLs.
//!
//! # Architecture
//!
//! - [`credential`]: cookie pool and the rate-limit ledger shared by all requests
//! - [`upstream`]: the [`Transport`] seam plus the reqwest implementation
//! - [`engine`]: response classification, the retry loop, the task poller and
//!   result assembly
//! - [`server`]: the axum HTTP surface
//!
//! # Usage
//!
//! ```bash
//! GS_COOKIE="session_id=a,session_id=b" genspark2api --port 7055
//! ```
//!
//! # Examples
//!
//! ```rust
//! use genspark2api::{Settings, VideoGenerationRequest, VideoGenerator};
//!
//! # async fn example() -> genspark2api::Result<()> {
//! let mut settings = Settings::default();
//! settings.credentials.cookies = vec!["session_id=abc".to_string()];
//! let generator = VideoGenerator::new(&settings)?;
//!
//! let request = VideoGenerationRequest::new("sora-2", "a cat surfing").with_duration(10);
//! let response = generator.generate(&request).await?;
//! for video in &response.data {
//!     println!("{}", video.url);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod credential;
pub mod engine;
pub mod error;
pub mod server;
pub mod types;
pub mod upstream;
pub mod utils;

pub use config::Settings;
pub use credential::{Credential, CredentialPool, RateLimitLedger};
pub use engine::VideoGenerator;
pub use error::{Error, Result};
pub use types::{ErrorResponse, PingResponse, VideoGenerationRequest, VideoGenerationResponse};
pub use upstream::Transport;
