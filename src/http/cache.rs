//! HTTP cache validation module
//!
//! Provides `ETag` generation and `If-None-Match` evaluation. Only the client
//! revalidates; the server never keeps a copy of a rendered document.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Quoted strong `ETag` for a response body, e.g. `"9f3a1c0d2b7e4a51"`
pub fn generate_etag(body: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("\"{:016x}\"", hasher.finish())
}

/// True when the client's `If-None-Match` names `etag` (list or `*`), i.e. a 304 is due
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|header| {
        header.split(',').map(str::trim).any(|candidate| {
            candidate == "*" || candidate == etag || candidate.strip_prefix("W/") == Some(etag)
        })
    })
}
