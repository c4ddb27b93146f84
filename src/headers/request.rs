//! Request-direction header policy.
//!
//! # Responsibilities
//! - Build the upstream header set from an empty map
//! - Apply the per-route forwarding flags (User-Agent, Referer, client IP)
//! - Copy through the fixed allow-list, nothing else
//!
//! # Design Decisions
//! - The inbound header set is never copied wholesale
//! - A disabled Referer flag omits the header entirely; an enabled flag
//!   with no caller Referer sends an empty value

use std::net::IpAddr;

use axum::http::header::{HeaderMap, HeaderValue, REFERER, USER_AGENT};

use crate::routes::RouteConfig;

/// Inbound headers copied through to the upstream unconditionally when
/// present. No other inbound header is ever forwarded.
pub const REQUEST_FORWARD_LIST: &[&str] = &[
    "accept",
    "accept-language",
    "x-requested-with",
    "origin",
    "content-type",
    "cache-control",
];

/// Build the outbound header set for one upstream request.
pub fn build_upstream_headers(
    route: &RouteConfig,
    inbound: &HeaderMap,
    client_addr: IpAddr,
) -> HeaderMap {
    let mut out = HeaderMap::new();

    if route.forward_user_agent {
        let ua = inbound
            .get(USER_AGENT)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(""));
        out.insert(USER_AGENT, ua);
    }

    if route.forward_referrer {
        let referer = inbound
            .get(REFERER)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(""));
        out.insert(REFERER, referer);
    }

    if route.forward_client_ip {
        if let Ok(value) = HeaderValue::from_str(&client_addr.to_string()) {
            out.insert("x-forwarded-for", value);
        }
    }

    for name in REQUEST_FORWARD_LIST {
        for value in inbound.get_all(*name) {
            out.append(*name, value.clone());
        }
    }

    out
}
