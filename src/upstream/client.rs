//! reqwest-backed [`Transport`]
//!
//! Presents itself to the upstream as a desktop browser: every call carries
//! the origin/referer pair of the web app, a browser user agent and the
//! session cookie.

use super::transport::{ByteStream, Transport};
use super::wire::RecaptchaReply;
use crate::{Error, Result, config::settings::UpstreamSettings, credential::Credential};
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE, COOKIE, ORIGIN, REFERER, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder};
use std::time::Duration;

const SUBMIT_PATH: &str = "/api/copilot/ask";
const TASK_STATUS_PATH: &str = "/api/vg_tasks_status";
const DELETE_PROJECT_PATH: &str = "/api/project/delete";

/// HTTP transport for the upstream web application
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    /// Client for upstream calls, routed through the outbound proxy
    client: Client,
    /// Client for the recaptcha-bypass proxy, TLS verification disabled
    recaptcha_client: Client,
    base_url: String,
    user_agent: String,
    request_timeout: Duration,
    recaptcha_proxy_url: Option<String>,
}

impl ReqwestTransport {
    /// Build clients from the upstream settings
    pub fn new(settings: &UpstreamSettings) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(settings.user_agent.clone())
            .connect_timeout(Duration::from_secs(30));

        if let Some(proxy) = &settings.proxy_url {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| Error::config(format!("Invalid proxy_url {}: {}", proxy, e)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;
        let recaptcha_client = Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            recaptcha_client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            user_agent: settings.user_agent.clone(),
            request_timeout: settings.request_timeout(),
            recaptcha_proxy_url: settings
                .recaptcha_proxy_url
                .as_deref()
                .map(normalize_recaptcha_url),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Request carrying the browser header set and the session cookie
    fn browser_request(&self, method: Method, url: &str, credential: &Credential) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "*/*")
            .header(ORIGIN, &self.base_url)
            .header(REFERER, format!("{}/", self.base_url))
            .header(USER_AGENT, &self.user_agent)
            .header(COOKIE, credential.as_str())
    }
}

/// Ensure a trailing slash and append the provider route
fn normalize_recaptcha_url(base: &str) -> String {
    let base = base.trim();
    if base.ends_with('/') {
        format!("{}genspark", base)
    } else {
        format!("{}/genspark", base)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn submit(&self, credential: &Credential, body: &str) -> Result<String> {
        let response = self
            .browser_request(Method::POST, &self.endpoint(SUBMIT_PATH), credential)
            .timeout(self.request_timeout)
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| Error::transport(format!("submission request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("failed to read submission response: {}", e)))?;
        // Non-2xx bodies still go through classification (rate limits arrive as 4xx)
        tracing::debug!("Submission answered {} with {} bytes", status, text.len());
        Ok(text)
    }

    async fn open_status_stream(&self, credential: &Credential, body: &str) -> Result<ByteStream> {
        let response = self
            .browser_request(Method::POST, &self.endpoint(TASK_STATUS_PATH), credential)
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| Error::transport(format!("failed to make stream request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::transport(format!(
                "status stream returned {}: {}",
                status, text
            )));
        }

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(Error::from))
            .boxed())
    }

    async fn delete_project(&self, credential: &Credential, project_id: &str) -> Result<()> {
        let response = self
            .browser_request(
                Method::GET,
                &self.endpoint(DELETE_PROJECT_PATH),
                credential,
            )
            .query(&[("project_id", project_id)])
            .timeout(Duration::from_secs(60))
            .send()
            .await
            .map_err(|e| Error::cleanup(format!("delete request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::cleanup(format!(
                "delete project {} returned {}",
                project_id,
                response.status()
            )));
        }
        Ok(())
    }

    async fn recaptcha_token(&self, credential: &Credential) -> Result<Option<String>> {
        let Some(url) = &self.recaptcha_proxy_url else {
            return Ok(None);
        };

        let response = match self
            .recaptcha_client
            .get(url)
            .header(CONTENT_TYPE, "application/json")
            .header(COOKIE, credential.as_str())
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Recaptcha proxy unreachable: {}", e);
                return Ok(None);
            }
        };

        if response.status() != reqwest::StatusCode::OK {
            tracing::warn!("Recaptcha proxy answered {}", response.status());
            return Ok(None);
        }

        match response.json::<RecaptchaReply>().await {
            Ok(reply) if reply.code == 200 && !reply.token.is_empty() => {
                tracing::debug!("Recaptcha token obtained");
                Ok(Some(reply.token))
            }
            Ok(reply) => {
                tracing::warn!(
                    "Recaptcha proxy refused: code={} message={}",
                    reply.code,
                    reply.message
                );
                Ok(None)
            }
            Err(e) => {
                tracing::warn!("Recaptcha proxy returned malformed JSON: {}", e);
                Ok(None)
            }
        }
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .timeout(Duration::from_secs(60))
            .send()
            .await
            .map_err(|e| Error::transport(format!("failed to fetch image {}: {}", url, e)))?
            .error_for_status()
            .map_err(|e| Error::transport(format!("failed to fetch image {}: {}", url, e)))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::transport(format!("failed to read image {}: {}", url, e)))?;
        Ok(bytes.to_vec())
    }
}
