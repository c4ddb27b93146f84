//! Mimetype group classification.
//!
//! # Responsibilities
//! - Parse the leaf subtype out of a Content-Type header value
//! - Map subtypes to named groups via a static table
//! - Return an explicit no-match instead of guessing
//!
//! # Design Decisions
//! - Only the subtype (after `/`, before `;`) participates in the lookup
//! - Unknown subtypes classify to None; the engine treats that as blocked
//!   when filtering is active

use serde::{Deserialize, Serialize};

/// Named bucket a MIME subtype is classified into for allow-list filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentGroup {
    /// Structured JSON payloads; body must parse.
    Json,
    /// XML documents and feeds; body must be well-formed.
    Xml,
    /// Plain-text formats; body must be clean UTF-8.
    Txt,
    /// Markup and script text; body must be clean UTF-8.
    Utf8,
    /// Binary media; never body-validated.
    Media,
}

impl ContentGroup {
    /// The group name as it appears in route configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentGroup::Json => "json",
            ContentGroup::Xml => "xml",
            ContentGroup::Txt => "txt",
            ContentGroup::Utf8 => "utf8",
            ContentGroup::Media => "media",
        }
    }

    /// Parse a group name from route configuration.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "json" => Some(ContentGroup::Json),
            "xml" => Some(ContentGroup::Xml),
            "txt" => Some(ContentGroup::Txt),
            "utf8" => Some(ContentGroup::Utf8),
            "media" => Some(ContentGroup::Media),
            _ => None,
        }
    }

    /// Look up the group for a leaf MIME subtype.
    ///
    /// The table is fixed at compile time; subtypes not listed here have
    /// no group and are rejected whenever filtering is active.
    pub fn from_subtype(subtype: &str) -> Option<Self> {
        match subtype {
            "json" | "ld+json" | "geo+json" | "manifest+json" | "problem+json"
            | "vnd.api+json" => Some(ContentGroup::Json),

            "xml" | "rss+xml" | "atom+xml" | "xhtml+xml" | "svg+xml" | "soap+xml"
            | "xslt+xml" | "mathml+xml" => Some(ContentGroup::Xml),

            "plain" | "csv" | "tab-separated-values" | "markdown" | "vcard"
            | "calendar" => Some(ContentGroup::Txt),

            "html" | "css" | "javascript" | "x-javascript" | "ecmascript" => {
                Some(ContentGroup::Utf8)
            }

            "mpeg" | "mp4" | "webm" | "ogg" | "wav" | "x-wav" | "aac" | "flac"
            | "png" | "jpeg" | "gif" | "webp" | "avif" | "bmp" | "tiff" | "x-icon"
            | "vnd.microsoft.icon" | "woff" | "woff2" | "otf" | "ttf" | "pdf"
            | "zip" | "gzip" | "octet-stream" => Some(ContentGroup::Media),

            _ => None,
        }
    }
}

impl std::fmt::Display for ContentGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extract the leaf subtype from a Content-Type header value.
///
/// `application/rss+xml; charset=UTF-8` yields `rss+xml`. Returns an empty
/// string when the value has no `/`.
pub fn mime_subtype(content_type: &str) -> String {
    let essence = content_type.split(';').next().unwrap_or("");
    match essence.split_once('/') {
        Some((_, subtype)) => subtype.trim().to_ascii_lowercase(),
        None => String::new(),
    }
}

/// Classify a Content-Type header value into a mimetype group.
///
/// Pure function of the static table: the same input always yields the
/// same group.
pub fn classify(content_type: &str) -> Option<ContentGroup> {
    ContentGroup::from_subtype(&mime_subtype(content_type))
}
