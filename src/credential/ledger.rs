//! Rate-limit ledger
//!
//! Records until when a cookie must not be selected. Entries expire lazily:
//! nothing sweeps the map, an entry simply stops counting once its deadline
//! is in the past.
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use genspark2api::{Credential, RateLimitLedger};
//!
//! # tokio_test::block_on(async {
//! let ledger = RateLimitLedger::new();
//! let cookie = Credential::from("session_id=abc");
//! ledger.mark(&cookie, Utc::now() + Duration::minutes(10)).await;
//! assert!(!ledger.is_eligible(&cookie, Utc::now()).await);
//! # });
//! ```

use super::Credential;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Cooldown deadlines keyed by credential
#[derive(Debug, Default)]
pub struct RateLimitLedger {
    entries: RwLock<HashMap<Credential, DateTime<Utc>>>,
}

impl RateLimitLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `credential` must not be used before `until`.
    ///
    /// Marks are max-wins: a second mark with an earlier deadline never
    /// shortens a cooldown already in place.
    pub async fn mark(&self, credential: &Credential, until: DateTime<Utc>) {
        let mut entries = self.entries.write().await;
        match entries.get_mut(credential) {
            Some(existing) if *existing >= until => {}
            Some(existing) => *existing = until,
            None => {
                entries.insert(credential.clone(), until);
            }
        }
        tracing::debug!("Cookie {} cooling down until {}", credential, until);
    }

    /// True iff no entry exists for `credential` or `now` is at or past its deadline
    pub async fn is_eligible(&self, credential: &Credential, now: DateTime<Utc>) -> bool {
        let entries = self.entries.read().await;
        entries.get(credential).is_none_or(|until| now >= *until)
    }

    /// Deadline currently recorded for `credential`, expired or not
    pub async fn deadline(&self, credential: &Credential) -> Option<DateTime<Utc>> {
        self.entries.read().await.get(credential).copied()
    }

    /// Number of credentials still cooling down at `now`
    pub async fn cooling_down(&self, now: DateTime<Utc>) -> usize {
        let entries = self.entries.read().await;
        entries.values().filter(|until| now < **until).count()
    }

    /// Number of recorded entries, including expired ones
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
