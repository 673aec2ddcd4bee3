//! Submission response classification
//!
//! The upstream signals credential problems and outages in the response body
//! rather than through status codes. Only error text is matched: typed stream
//! events (`project_start`, `message_result`, ...) carry prompt and assistant
//! text and are never inspected, except those typed `error`. For the
//! remaining lines, JSON objects contribute their `message`/`error`/`detail`
//! strings and anything else is taken verbatim.
//!
//! Rules are evaluated top to bottom and the first match wins: rate-limit and
//! free-tier bodies can also contain the generic error text, so those rules
//! must stay ahead of the fatal ones.

use serde_json::Value;
use std::fmt;

/// Credential-specific refusal; the retry loop may move to another cookie
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    RateLimited,
    FreeTierExhausted,
    NotAuthenticated,
}

/// Upstream failure that another cookie would not fix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fatal {
    ServerError,
    Overloaded,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RateLimited => "rate limit reached",
            Self::FreeTierExhausted => "free limit reached",
            Self::NotAuthenticated => "cookie not login",
        })
    }
}

impl fmt::Display for Fatal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ServerError => "server error",
            Self::Overloaded => "server overloaded",
        })
    }
}

/// Outcome of matching a submission body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Rejected(Rejection),
    Fatal(Fatal),
}

struct Rule {
    signatures: &'static [&'static str],
    outcome: Classification,
}

// Order is load-bearing, see module docs.
const RULES: &[Rule] = &[
    Rule {
        signatures: &["rate limit", "too many requests"],
        outcome: Classification::Rejected(Rejection::RateLimited),
    },
    Rule {
        signatures: &["free usage limit", "quota exceeded"],
        outcome: Classification::Rejected(Rejection::FreeTierExhausted),
    },
    Rule {
        signatures: &["not login", "please login", "unauthorized"],
        outcome: Classification::Rejected(Rejection::NotAuthenticated),
    },
    Rule {
        signatures: &["an error occurred with the current request"],
        outcome: Classification::Fatal(Fatal::ServerError),
    },
    Rule {
        signatures: &["overloaded"],
        outcome: Classification::Fatal(Fatal::Overloaded),
    },
];

/// Classify a raw submission body; `None` means no failure signature matched
pub fn classify(body: &str) -> Option<Classification> {
    let texts: Vec<String> = body.lines().filter_map(error_text).collect();
    RULES
        .iter()
        .find(|rule| {
            texts
                .iter()
                .any(|text| rule.signatures.iter().any(|sig| text.contains(sig)))
        })
        .map(|rule| rule.outcome)
}

/// Lowercased error text carried by one body line, if any
fn error_text(line: &str) -> Option<String> {
    let line = line.trim();
    let payload = line.strip_prefix("data:").map(str::trim).unwrap_or(line);
    if payload.is_empty() {
        return None;
    }

    let Ok(value) = serde_json::from_str::<Value>(payload) else {
        return Some(payload.to_lowercase());
    };
    let object = value.as_object()?;
    if object
        .get("type")
        .is_some_and(|kind| kind.as_str() != Some("error"))
    {
        return None;
    }

    let mut text = String::new();
    for key in ["message", "error", "detail"] {
        match object.get(key) {
            Some(Value::String(s)) => text.push_str(s),
            Some(Value::Object(nested)) => {
                if let Some(Value::String(s)) = nested.get("message") {
                    text.push_str(s);
                }
            }
            _ => continue,
        }
        text.push('\n');
    }
    (!text.is_empty()).then(|| text.to_lowercase())
}
