//! Content classification and validation subsystem.
//!
//! # Data Flow
//! ```text
//! Upstream response:
//!     → groups.rs (Content-Type header → mimetype group)
//!     → validate.rs (body well-formedness per group)
//!     → engine decides: relay, or block with 406
//! ```
//!
//! # Design Decisions
//! - The subtype → group table is a hardcoded constant; classification
//!   is a pure function of it
//! - Text-like groups share one UTF-8/control-byte precondition
//! - `media` and unclassified subtypes are never body-validated

pub mod groups;
pub mod validate;

pub use groups::{classify, mime_subtype, ContentGroup};
pub use validate::{is_clean_utf8_text, is_valid_json, is_valid_xml, validate_body};
