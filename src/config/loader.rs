//! Settings assembly
//!
//! Layers the adapter settings: built-in defaults, then the TOML file, then
//! environment overrides. CLI flags are applied afterwards by the caller.

use crate::{Result, config::Settings};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Builds validated [`Settings`] for the server
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// File consulted when `load` is called without an explicit path
    fallback_file: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `path` whenever no file is passed to [`ConfigLoader::load`]
    pub fn with_fallback_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.fallback_file = Some(path.into());
        self
    }

    /// Assemble settings from `config_file` (or the fallback) and the environment
    ///
    /// A path that does not exist is not an error; the defaults are used.
    pub fn load(&self, config_file: Option<&Path>) -> Result<Settings> {
        let path = config_file.or(self.fallback_file.as_deref());
        let mut settings = match path {
            Some(path) if path.exists() => {
                info!("Reading settings from {}", path.display());
                Settings::from_file(path)?
            }
            Some(path) => {
                warn!("No settings file at {}, using defaults", path.display());
                Settings::default()
            }
            None => Settings::default(),
        };

        settings = settings.merge_with_env()?;
        drop_orphan_chat_ids(&mut settings);
        settings.validate()?;

        info!(
            "Settings ready: {} cookie(s), {} chat binding(s), max_attempts={}, auto_delete={}",
            settings.credentials.cookies.len(),
            settings.credentials.chat_ids.len(),
            settings.retry.max_attempts,
            settings.session.auto_delete
        );
        Ok(settings)
    }
}

/// Chat ids bound to cookies outside the pool can never be used
fn drop_orphan_chat_ids(settings: &mut Settings) {
    let cookies = &settings.credentials.cookies;
    settings.credentials.chat_ids.retain(|cookie, _| {
        let known = cookies.iter().any(|c| c == cookie);
        if !known {
            debug!("Ignoring chat id bound to a cookie outside the pool");
        }
        known
    });
}
