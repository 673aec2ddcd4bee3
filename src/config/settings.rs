//! Configuration settings structure
//!
//! Defines the main settings structure and loading logic for the adapter.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Browser-style user agent sent with every upstream call
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Main configuration settings for the adapter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Server configuration
    pub server: ServerSettings,
    /// Session cookie pool
    pub credentials: CredentialSettings,
    /// Upstream service configuration
    pub upstream: UpstreamSettings,
    /// Failover configuration
    pub retry: RetrySettings,
    /// Upstream session housekeeping
    pub session: SessionSettings,
    /// Logging configuration
    pub logging: LoggingSettings,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
}

/// Session cookie pool configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialSettings {
    /// Raw `Cookie` header values, one per upstream account
    pub cookies: Vec<String>,
    /// Existing chat id to continue, keyed by cookie
    pub chat_ids: HashMap<String, String>,
}

/// Upstream service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamSettings {
    /// Origin of the upstream web application
    pub base_url: String,
    /// Outbound proxy for every upstream call
    pub proxy_url: Option<String>,
    /// Recaptcha-bypass proxy queried before each submission
    pub recaptcha_proxy_url: Option<String>,
    /// User agent presented to the upstream
    pub user_agent: String,
    /// Timeout for a single submission request, in seconds
    pub request_timeout_secs: u64,
    /// Upper bound for consuming the task status stream, in seconds
    pub poll_timeout_secs: u64,
}

/// Failover configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Upper bound on attempts per request (further capped by the pool size)
    pub max_attempts: usize,
    /// Cooldown applied to a rate-limited cookie, in seconds
    pub rate_limit_cooldown_secs: u64,
}

/// Upstream session housekeeping
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Delete the upstream project once its artifacts were collected
    pub auto_delete: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level
    pub level: String,
    /// Enable verbose logging
    pub verbose: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "::".to_string(),
            port: 7055,
        }
    }
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.genspark.ai".to_string(),
            proxy_url: None,
            recaptcha_proxy_url: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 600,
            poll_timeout_secs: 1800,
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            rate_limit_cooldown_secs: 600,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            verbose: false,
        }
    }
}

impl UpstreamSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }
}

impl RetrySettings {
    pub fn rate_limit_cooldown(&self) -> Duration {
        Duration::from_secs(self.rate_limit_cooldown_secs)
    }
}

impl Settings {
    /// Create new settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Invalid config file {:?}: {}", path, e)))
    }

    /// Apply environment variable overrides on top of these settings
    pub fn merge_with_env(mut self) -> crate::Result<Self> {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.server.host = host;
        }

        if let Ok(port) = std::env::var("PORT") {
            self.server.port = port
                .parse()
                .map_err(|e| crate::Error::Config(format!("Invalid port: {}", e)))?;
        }

        if let Ok(cookies) = std::env::var("GS_COOKIE") {
            self.credentials.cookies = split_cookies(&cookies);
        }

        if let Ok(base_url) = std::env::var("GS_BASE_URL") {
            self.upstream.base_url = base_url;
        }

        if let Ok(proxy) = std::env::var("PROXY_URL") {
            self.upstream.proxy_url = non_empty(proxy);
        }

        if let Ok(proxy) = std::env::var("RECAPTCHA_PROXY_URL") {
            self.upstream.recaptcha_proxy_url = non_empty(proxy);
        }

        if let Ok(user_agent) = std::env::var("USER_AGENT") {
            self.upstream.user_agent = user_agent;
        }

        if let Ok(timeout) = std::env::var("REQUEST_TIMEOUT") {
            self.upstream.request_timeout_secs = timeout
                .parse()
                .map_err(|e| crate::Error::Config(format!("Invalid request timeout: {}", e)))?;
        }

        if let Ok(timeout) = std::env::var("POLL_TIMEOUT") {
            self.upstream.poll_timeout_secs = timeout
                .parse()
                .map_err(|e| crate::Error::Config(format!("Invalid poll timeout: {}", e)))?;
        }

        if let Ok(retries) = std::env::var("MAX_RETRIES") {
            self.retry.max_attempts = retries
                .parse()
                .map_err(|e| crate::Error::Config(format!("Invalid max retries: {}", e)))?;
        }

        if let Ok(cooldown) = std::env::var("RATE_LIMIT_COOKIE_LOCK_DURATION") {
            self.retry.rate_limit_cooldown_secs = cooldown
                .parse()
                .map_err(|e| crate::Error::Config(format!("Invalid cooldown: {}", e)))?;
        }

        if let Ok(auto_delete) = std::env::var("AUTO_DEL_CHAT") {
            self.session.auto_delete = matches!(auto_delete.trim(), "1" | "true" | "TRUE");
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(self)
    }

    /// Check the settings for values the adapter cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        if self.retry.max_attempts == 0 {
            return Err(crate::Error::config("retry.max_attempts must be at least 1"));
        }
        if self.retry.rate_limit_cooldown_secs == 0 {
            return Err(crate::Error::config(
                "retry.rate_limit_cooldown_secs must be greater than zero",
            ));
        }
        if self.upstream.request_timeout_secs == 0 || self.upstream.poll_timeout_secs == 0 {
            return Err(crate::Error::config("upstream timeouts must be greater than zero"));
        }

        Url::parse(&self.upstream.base_url)
            .map_err(|e| crate::Error::Config(format!("Invalid upstream base_url: {}", e)))?;
        if let Some(proxy) = &self.upstream.proxy_url {
            Url::parse(proxy)
                .map_err(|e| crate::Error::Config(format!("Invalid proxy_url: {}", e)))?;
        }
        if let Some(proxy) = &self.upstream.recaptcha_proxy_url {
            let url = Url::parse(proxy)
                .map_err(|e| crate::Error::Config(format!("Invalid recaptcha_proxy_url: {}", e)))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(crate::Error::config(
                    "recaptcha_proxy_url must be an http(s) URL",
                ));
            }
        }

        if self.credentials.cookies.is_empty() {
            tracing::warn!("No cookies configured (GS_COOKIE); every generation request will fail");
        }

        Ok(())
    }

    /// Default config file location, `<config_dir>/genspark2api/config.toml`
    pub fn default_config_path() -> Option<std::path::PathBuf> {
        dirs::config_dir().map(|dir| dir.join("genspark2api").join("config.toml"))
    }
}

fn split_cookies(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|cookie| !cookie.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
