//! Credential pool
//!
//! Selects cookies for the retry loop. The pool itself is immutable after
//! construction; eligibility comes from the shared [`RateLimitLedger`].

use super::{Credential, RateLimitLedger};
use crate::{Error, Result};
use chrono::Utc;
use rand::seq::IndexedRandom;
use std::collections::HashSet;
use std::sync::Arc;

/// Fixed set of session cookies plus the ledger that tracks their cooldowns
#[derive(Debug)]
pub struct CredentialPool {
    credentials: Vec<Credential>,
    ledger: Arc<RateLimitLedger>,
}

impl CredentialPool {
    /// Build a pool, dropping blank and duplicate cookies
    pub fn new<I, S>(cookies: I, ledger: Arc<RateLimitLedger>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let credentials = cookies
            .into_iter()
            .map(Into::into)
            .filter(|cookie| !cookie.trim().is_empty())
            .map(Credential::from)
            .filter(|credential| seen.insert(credential.clone()))
            .collect();

        Self {
            credentials,
            ledger,
        }
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    pub fn ledger(&self) -> &Arc<RateLimitLedger> {
        &self.ledger
    }

    /// Uniformly random eligible credential
    pub async fn pick_initial(&self) -> Result<Credential> {
        let candidates = self.eligible_excluding(&HashSet::new()).await;
        candidates
            .choose(&mut rand::rng())
            .cloned()
            .ok_or(Error::NoEligibleCredential)
    }

    /// Another eligible credential that is not in `attempted`
    pub async fn pick_next(&self, attempted: &HashSet<Credential>) -> Result<Credential> {
        let candidates = self.eligible_excluding(attempted).await;
        candidates
            .choose(&mut rand::rng())
            .cloned()
            .ok_or(Error::CredentialsExhausted { last_error: None })
    }

    async fn eligible_excluding(&self, attempted: &HashSet<Credential>) -> Vec<Credential> {
        let now = Utc::now();
        let mut eligible = Vec::with_capacity(self.credentials.len());
        for credential in &self.credentials {
            if attempted.contains(credential) {
                continue;
            }
            if self.ledger.is_eligible(credential, now).await {
                eligible.push(credential.clone());
            }
        }
        eligible
    }
}
