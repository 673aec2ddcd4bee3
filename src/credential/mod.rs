//! Session cookie management
//!
//! The adapter holds a fixed pool of upstream session cookies loaded at
//! startup. Cookies are never mutated; a cookie that hit a rate limit is
//! recorded in the [`RateLimitLedger`] and skipped by the [`CredentialPool`]
//! until its deadline passes.

pub mod ledger;
pub mod pool;

pub use ledger::RateLimitLedger;
pub use pool::CredentialPool;

use std::fmt;
use std::sync::Arc;

/// An opaque upstream session cookie
///
/// Cheap to clone; equality and hashing use the raw value, so it doubles as
/// the ledger key. `Display` only shows a masked preview.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential(Arc<str>);

impl Credential {
    pub fn new(raw: impl Into<Arc<str>>) -> Self {
        Self(raw.into())
    }

    /// Raw value, suitable for a `Cookie` header
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preview: String = self.0.chars().take(12).collect();
        if self.0.chars().count() > 12 {
            write!(f, "{}***", preview)
        } else {
            write!(f, "{}", preview)
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&self.to_string()).finish()
    }
}

impl From<&str> for Credential {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Credential {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}
