//! Response-direction header policy.
//!
//! # Responsibilities
//! - Relay only allow-listed upstream headers to the client
//! - Re-case forwarded names to Capitalized-Hyphenated form
//! - Append the two fixed security headers
//!
//! # Design Decisions
//! - `Set-Cookie` and all other off-list headers are dropped
//!   unconditionally
//! - Multi-valued headers become repeated entries, never comma-joined

use axum::http::header::{HeaderMap, HeaderValue};

/// Upstream headers relayed to the client; everything else is dropped.
pub const RESPONSE_RELAY_LIST: &[&str] = &[
    "content-type",
    "cache-control",
    "etag",
    "location",
    "x-request-id",
    "x-frame-options",
    "accept-ranges",
    "content-disposition",
    "vary",
];

/// Re-case a lower-cased header name to Capitalized-Hyphenated form.
///
/// `x-request-id` becomes `X-Request-Id`.
pub fn canonical_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, segment) in name.split('-').enumerate() {
        if i > 0 {
            out.push('-');
        }
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.extend(chars.flat_map(|c| c.to_lowercase()));
        }
    }
    out
}

/// Filter an upstream header map down to the client-facing set.
///
/// Returns name/value pairs in upstream order, one entry per header line,
/// with the two fixed security headers appended after the allow-listed
/// ones.
pub fn filter_response_headers(upstream: &HeaderMap) -> Vec<(String, HeaderValue)> {
    let mut out = Vec::new();

    for (name, value) in upstream.iter() {
        let lower = name.as_str();
        if RESPONSE_RELAY_LIST.contains(&lower) {
            out.push((canonical_case(lower), value.clone()));
        }
    }

    out.push((
        "X-Content-Type-Options".to_string(),
        HeaderValue::from_static("nosniff"),
    ));
    out.push((
        "X-Robots-Tag".to_string(),
        HeaderValue::from_static("noindex, nofollow"),
    ));

    out
}
