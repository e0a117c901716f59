//! Durable record model.
//!
//! sled carries plain byte values and has no native TTL, so a record encodes
//! its own reservation lease: a placeholder is an empty url plus an absolute
//! expiry, a resolved record is a non-empty url and no expiry. Resolved
//! records are immutable; keys are never reused after resolution.

use serde::{Deserialize, Serialize};

use crate::errors::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Target URL; empty for a reservation placeholder.
    pub url: String,
    /// Lease expiry (unix seconds) for placeholders, `None` once resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserved_until: Option<i64>,
}

impl Record {
    pub fn resolved(url: impl Into<String>) -> Self {
        Record {
            url: url.into(),
            reserved_until: None,
        }
    }

    pub fn placeholder(reserved_until: i64) -> Self {
        Record {
            url: String::new(),
            reserved_until: Some(reserved_until),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.url.is_empty()
    }

    /// A placeholder whose lease has passed is reclaimable: the uniqueness
    /// probe treats it as free and a late commit must be refused.
    pub fn lease_expired(&self, now: i64) -> bool {
        self.is_placeholder() && self.reserved_until.is_none_or(|t| t <= now)
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(raw: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(raw)?)
    }
}
