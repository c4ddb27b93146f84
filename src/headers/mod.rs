//! Header policy subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request headers:
//!     → request.rs (per-route flags + fixed allow-list)
//!     → upstream request
//!
//! Upstream response headers:
//!     → response.rs (fixed allow-list, canonical casing)
//!     → + two fixed security headers
//!     → client response
//! ```
//!
//! # Design Decisions
//! - Both directions start from an empty set; nothing crosses by default
//! - Dropping `Set-Cookie` (and everything else off-list) is a security
//!   boundary, not an oversight
//! - Multi-valued headers stay multi-valued; no comma-joining

pub mod request;
pub mod response;

pub use request::{build_upstream_headers, REQUEST_FORWARD_LIST};
pub use response::{canonical_case, filter_response_headers, RESPONSE_RELAY_LIST};
