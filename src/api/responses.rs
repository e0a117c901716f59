//! Wire DTOs shared by the store engine API, the cache node API and the
//! store client.
//!
//! Requests are form-encoded, responses are JSON. Every response carries a
//! `succeeded` flag; business failures travel as `succeeded: false` with a
//! human-readable `errorMsg` under HTTP 200, while malformed bodies get a
//! plain 400.

use serde::{Deserialize, Serialize};

use crate::errors::ShortpoolError;

#[derive(Debug, Clone, Deserialize)]
pub struct ShortenRequest {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    pub key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReserveRequest {
    pub num: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitRequest {
    pub key: String,
    pub url: String,
}

/// Response shape shared by shorten, query and setReserve.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortenQueryResponse {
    pub succeeded: bool,
    #[serde(default, rename = "errorMsg")]
    pub error_msg: String,
    #[serde(default)]
    pub key: String,
    #[serde(default, rename = "originalURL")]
    pub original_url: String,
}

impl ShortenQueryResponse {
    pub fn ok(key: impl Into<String>, original_url: impl Into<String>) -> Self {
        ShortenQueryResponse {
            succeeded: true,
            error_msg: String::new(),
            key: key.into(),
            original_url: original_url.into(),
        }
    }

    pub fn failed(key: impl Into<String>, err: &ShortpoolError) -> Self {
        ShortenQueryResponse {
            succeeded: false,
            error_msg: err.to_string(),
            key: key.into(),
            original_url: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveResponse {
    pub succeeded: bool,
    #[serde(default, rename = "errorMsg")]
    pub error_msg: String,
    #[serde(default)]
    pub keys: Vec<String>,
}

impl ReserveResponse {
    pub fn ok(keys: Vec<String>) -> Self {
        ReserveResponse {
            succeeded: true,
            error_msg: String::new(),
            keys,
        }
    }

    pub fn failed(err: &ShortpoolError) -> Self {
        ReserveResponse {
            succeeded: false,
            error_msg: err.to_string(),
            keys: Vec::new(),
        }
    }
}
