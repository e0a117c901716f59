//! Base-62 key codec and input validation.
//!
//! Keys are produced by encoding a uniformly random integer in `[0, 62^7)`
//! into base 62, least-significant digit first. Leading-zero digits are
//! omitted, so keys have variable length (1 to 7 characters).

use url::Url;

use crate::errors::{Result, ShortpoolError};

const BASE62_LUT: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Longest key the keyspace can produce.
pub const MAX_KEY_LEN: usize = 7;

/// 62^7, the full keyspace.
pub const KEYSPACE_SIZE: u64 = 3_521_614_606_208;

/// Upper bound on accepted URLs, in bytes.
pub const MAX_URL_LEN: usize = 1 << 13;

/// Encode `num` as base 62, least-significant digit first.
pub fn base62_encode(mut num: u64) -> String {
    let mut out = Vec::with_capacity(MAX_KEY_LEN);
    while num >= 62 {
        out.push(BASE62_LUT[(num % 62) as usize]);
        num /= 62;
    }
    out.push(BASE62_LUT[num as usize]);
    // LUT bytes are ASCII
    String::from_utf8(out).unwrap_or_default()
}

/// Draw a uniformly random key in `[0, keyspace)`.
pub fn random_key(keyspace: u64) -> u64 {
    rand::random_range(0..keyspace)
}

/// A well-formed key is non-empty ASCII alphanumeric.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Validate that `url` parses with a non-empty scheme and host and fits the
/// length bound. Never consult the network.
pub fn validate_url(url: &str) -> Result<()> {
    if url.is_empty() {
        return Err(ShortpoolError::invalid_input("url cannot be empty"));
    }
    if url.len() > MAX_URL_LEN {
        return Err(ShortpoolError::invalid_input(format!(
            "url exceeds {} bytes",
            MAX_URL_LEN
        )));
    }
    let parsed = Url::parse(url)
        .map_err(|e| ShortpoolError::invalid_input(format!("invalid url {}: {}", url, e)))?;
    if parsed.scheme().is_empty() || parsed.host_str().is_none() {
        return Err(ShortpoolError::invalid_input(format!(
            "invalid url {}: missing scheme or host",
            url
        )));
    }
    Ok(())
}
