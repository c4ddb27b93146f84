//! Relay engine subsystem.
//!
//! # Data Flow
//! ```text
//! (route_id, sub_path, query) from the HTTP layer
//!     → engine.rs (enabled? route? path safe?)
//!     → headers/request policy → upstream.rs (bounded transfer)
//!     → content classification + validation
//!     → headers/response policy → terminal response
//!     on any failure → error.rs (one terminal status, short message)
//! ```
//!
//! # Design Decisions
//! - The engine owns the whole lifecycle; the HTTP layer only decomposes
//!   URLs and buffers bodies
//! - Redirect/no-content statuses bypass content inspection
//! - Filtered error pages are rewritten into plain-text diagnostics
//!   (sanitize.rs) instead of being relayed

pub mod engine;
pub mod error;
pub mod sanitize;
pub mod upstream;

pub use engine::{RelayEngine, RelayRequest};
pub use error::RelayError;
pub use upstream::UpstreamClient;
