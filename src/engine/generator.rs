//! Video generation retry loop
//!
//! One call to [`VideoGenerator::generate`] walks the cookie pool: each
//! attempt submits with a cookie not yet tried in this call, classifies the
//! response and either polls the announced tasks, moves on to the next cookie
//! or gives up. With a single usable attempt every failure is terminal.

use super::{
    assembler::ResultAssembler,
    classify::{Classification, Rejection, classify},
    poller::TaskPoller,
    submission::{build_submission, extract_tasks, resolve_reference_image},
};
use crate::{
    Error, Result,
    config::Settings,
    credential::{Credential, CredentialPool, RateLimitLedger},
    types::{VideoGenerationRequest, VideoGenerationResponse, is_video_model},
    upstream::{ReqwestTransport, Transport},
};
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

/// Cooldown applied when a cookie has used up its free tier
pub const FREE_TIER_COOLDOWN: Duration = Duration::from_secs(24 * 60 * 60);

enum AttemptOutcome {
    Succeeded(VideoGenerationResponse),
    /// Failure another cookie might not hit
    Retry(Error),
}

/// Turns one video generation request into artifact URLs
#[derive(Debug)]
pub struct VideoGenerator {
    transport: Arc<dyn Transport>,
    pool: CredentialPool,
    poller: TaskPoller,
    assembler: ResultAssembler,
    max_attempts: usize,
    rate_limit_cooldown: Duration,
    chat_ids: HashMap<String, String>,
}

impl VideoGenerator {
    /// Create a generator backed by the HTTP transport
    pub fn new(settings: &Settings) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(&settings.upstream)?);
        Ok(Self::with_transport(settings, transport))
    }

    /// Create a generator over an arbitrary transport
    pub fn with_transport(settings: &Settings, transport: Arc<dyn Transport>) -> Self {
        let ledger = Arc::new(RateLimitLedger::new());
        Self {
            transport,
            pool: CredentialPool::new(settings.credentials.cookies.iter().cloned(), ledger),
            poller: TaskPoller::new(settings.upstream.poll_timeout()),
            assembler: ResultAssembler::new(settings.session.auto_delete),
            max_attempts: settings.retry.max_attempts,
            rate_limit_cooldown: settings.retry.rate_limit_cooldown(),
            chat_ids: settings.credentials.chat_ids.clone(),
        }
    }

    pub fn pool(&self) -> &CredentialPool {
        &self.pool
    }

    /// Cookies currently excluded by a cooldown
    pub async fn cooling_down(&self) -> usize {
        self.pool.ledger().cooling_down(Utc::now()).await
    }

    /// Generate videos for `request`, failing over across cookies
    pub async fn generate(&self, request: &VideoGenerationRequest) -> Result<VideoGenerationResponse> {
        validate(request)?;

        let max_attempts = self.max_attempts.min(self.pool.len()).max(1);
        let single_shot = max_attempts == 1;

        let mut credential = self.pool.pick_initial().await.inspect_err(|_| {
            tracing::error!("No eligible cookie for model {}", request.model);
        })?;
        let image = resolve_reference_image(self.transport.as_ref(), request).await?;

        let mut attempted = HashSet::new();
        let mut last_error: Option<String> = None;

        for attempt in 1..=max_attempts {
            attempted.insert(credential.clone());

            let error = match self
                .attempt(&credential, request, image.as_deref())
                .await?
            {
                AttemptOutcome::Succeeded(response) => return Ok(response),
                AttemptOutcome::Retry(error) => error,
            };

            if single_shot {
                tracing::error!("Attempt with cookie {} failed: {}", credential, error);
                return Err(error);
            }

            tracing::warn!(
                "Attempt {}/{} with cookie {} failed: {}",
                attempt,
                max_attempts,
                credential,
                error
            );
            last_error = Some(error.to_string());

            if attempt == max_attempts {
                break;
            }
            credential = match self.pool.pick_next(&attempted).await {
                Ok(next) => next,
                Err(_) => {
                    tracing::warn!("No untried eligible cookie left after attempt {}", attempt);
                    break;
                }
            };
        }

        let error = Error::CredentialsExhausted { last_error };
        tracing::error!("Video generation failed: {}", error);
        Err(error)
    }

    /// One submission plus polling with `credential`
    ///
    /// `Err` is terminal for the whole request; `Retry` lets the caller move
    /// to another cookie.
    async fn attempt(
        &self,
        credential: &Credential,
        request: &VideoGenerationRequest,
        image: Option<&str>,
    ) -> Result<AttemptOutcome> {
        let token = self.transport.recaptcha_token(credential).await?;
        let chat_id = self.chat_ids.get(credential.as_str()).map(String::as_str);
        let body = build_submission(request, image, chat_id, token);
        let payload = serde_json::to_string(&body)?;

        let response = self.transport.submit(credential, &payload).await?;

        match classify(&response) {
            Some(Classification::Rejected(rejection)) => {
                self.penalize(credential, rejection).await?;
                return Ok(AttemptOutcome::Retry(Error::rejection(rejection, response)));
            }
            Some(Classification::Fatal(fatal)) => {
                let error = Error::fatal(fatal, response);
                tracing::error!("Upstream failure: {}", error);
                return Err(error);
            }
            None => {}
        }

        let submitted = extract_tasks(&response);
        if submitted.task_ids.is_empty() {
            return Ok(AttemptOutcome::Retry(Error::no_artifact(format!(
                "no valid task IDs received, response: {}",
                response
            ))));
        }
        tracing::info!(
            "Submitted {} task(s) with cookie {}",
            submitted.task_ids.len(),
            credential
        );

        let result = self
            .poller
            .poll(self.transport.as_ref(), credential, &submitted.task_ids)
            .await?;
        if result.is_empty() {
            return Ok(AttemptOutcome::Retry(Error::no_artifact(result.detail())));
        }

        let response = self.assembler.assemble(&result.urls, &request.prompt);
        self.assembler.schedule_cleanup(
            self.transport.clone(),
            credential.clone(),
            submitted.project_id,
        );
        Ok(AttemptOutcome::Succeeded(response))
    }

    async fn penalize(&self, credential: &Credential, rejection: Rejection) -> Result<()> {
        let cooldown = match rejection {
            Rejection::RateLimited => self.rate_limit_cooldown,
            Rejection::FreeTierExhausted => FREE_TIER_COOLDOWN,
            Rejection::NotAuthenticated => return Ok(()),
        };
        let until = deadline_after(cooldown)?;
        self.pool.ledger().mark(credential, until).await;
        tracing::warn!("Cookie {} cooling down until {}", credential, until);
        Ok(())
    }
}

fn validate(request: &VideoGenerationRequest) -> Result<()> {
    if !is_video_model(&request.model) {
        return Err(Error::validation("Invalid model"));
    }
    if request.prompt.trim().is_empty() {
        return Err(Error::validation("prompt is required"));
    }
    Ok(())
}

fn deadline_after(cooldown: Duration) -> Result<DateTime<Utc>> {
    TimeDelta::from_std(cooldown)
        .ok()
        .and_then(|delta| Utc::now().checked_add_signed(delta))
        .ok_or_else(|| Error::internal(format!("cooldown {:?} out of range", cooldown)))
}
