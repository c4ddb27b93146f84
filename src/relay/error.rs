//! Relay failure taxonomy.
//!
//! # Responsibilities
//! - One variant per terminal rejection path
//! - Map each variant to its HTTP status and a short public message
//!
//! # Design Decisions
//! - Public messages carry no internal detail; upstream error text is
//!   logged, never relayed
//! - Every rejection is terminal; nothing here is retried

use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use thiserror::Error;

/// Terminal failure of one relay request.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The global relay flag is off.
    #[error("Relay is disabled.")]
    Disabled,

    /// No route exists for the requested id.
    #[error("Unknown route.")]
    RouteNotFound,

    /// The residual path contained a parent-directory traversal sequence.
    #[error("Invalid path: .. found")]
    PathTraversal,

    /// The upstream transfer failed (DNS, connect, timeout, TLS).
    #[error("Failed to fetch remote content.")]
    Upstream(#[source] reqwest::Error),

    /// The upstream body was blocked by content filtering.
    #[error("Blocked: {0}")]
    ContentBlocked(String),
}

impl RelayError {
    /// The HTTP status this failure terminates with.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::Disabled => StatusCode::FORBIDDEN,
            RelayError::RouteNotFound => StatusCode::NOT_FOUND,
            RelayError::PathTraversal => StatusCode::BAD_REQUEST,
            RelayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            RelayError::ContentBlocked(_) => StatusCode::NOT_ACCEPTABLE,
        }
    }

    /// Short label used for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            RelayError::Disabled => "disabled",
            RelayError::RouteNotFound => "route_not_found",
            RelayError::PathTraversal => "path_traversal",
            RelayError::Upstream(_) => "upstream_transport",
            RelayError::ContentBlocked(_) => "content_blocked",
        }
    }

    /// Render the terminal plain-text response for this failure.
    pub fn into_response(self) -> Response<Body> {
        Response::builder()
            .status(self.status())
            .header(
                header::CONTENT_TYPE,
                "text/plain; charset=UTF-8",
            )
            .body(Body::from(self.to_string()))
            .unwrap_or_else(|_| {
                let mut fallback = Response::new(Body::empty());
                *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                fallback
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(RelayError::Disabled.status(), StatusCode::FORBIDDEN);
        assert_eq!(RelayError::RouteNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(RelayError::PathTraversal.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            RelayError::ContentBlocked("x".into()).status(),
            StatusCode::NOT_ACCEPTABLE
        );
    }

    #[test]
    fn test_blocked_message_includes_reason() {
        let err = RelayError::ContentBlocked("Invalid JSON or encoding.".into());
        assert_eq!(err.to_string(), "Blocked: Invalid JSON or encoding.");
    }
}
