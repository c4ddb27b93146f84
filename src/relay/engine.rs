//! Relay request lifecycle.
//!
//! # Responsibilities
//! - Validate preconditions (relay flag, route existence, path safety)
//! - Build the upstream URL and header set
//! - Perform the transfer and apply content filtering to the response
//! - Emit exactly one terminal response per request
//!
//! # Design Decisions
//! - One request maps to one upstream attempt; nothing is retried
//! - Text-like bodies are buffered for validation; unfiltered and exempt
//!   responses stream straight through
//! - A blocked response never carries upstream bytes

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::body::{Body, Bytes};
use axum::http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use axum::http::{HeaderMap, Method, Response, StatusCode, Version};
use futures_util::TryStreamExt;

use crate::content::{self, ContentGroup};
use crate::headers;
use crate::observability::metrics;
use crate::relay::error::RelayError;
use crate::relay::sanitize;
use crate::relay::upstream::UpstreamClient;
use crate::routes::{RouteConfig, RouteStore, StoreError};

/// Upstream statuses relayed without body inspection even when filtering
/// is active: redirects and no-content responses have no representative
/// body to validate.
const FILTER_EXEMPT_STATUSES: &[u16] = &[204, 304, 301, 302, 307, 308, 202];

/// One inbound request, decomposed by the host router.
#[derive(Debug)]
pub struct RelayRequest {
    /// Public route identifier from the first path segment.
    pub route_id: String,
    /// Residual path after the route id; may be empty.
    pub sub_path: String,
    /// Raw query string from the original request URI.
    pub query: Option<String>,
    pub method: Method,
    pub version: Version,
    pub headers: HeaderMap,
    /// Raw request body; forwarded only for POST.
    pub body: Bytes,
    pub client_addr: IpAddr,
}

/// Orchestrates one relay request end to end.
pub struct RelayEngine {
    enabled: bool,
    store: Arc<RouteStore>,
    upstream: UpstreamClient,
}

impl RelayEngine {
    pub fn new(enabled: bool, store: Arc<RouteStore>, upstream: UpstreamClient) -> Self {
        Self {
            enabled,
            store,
            upstream,
        }
    }

    /// Handle one request, producing exactly one terminal response.
    pub async fn handle(&self, request: RelayRequest) -> Response<Body> {
        let start = Instant::now();
        let method = request.method.to_string();
        let route_id = request.route_id.clone();

        match self.relay(request).await {
            Ok(response) => {
                metrics::record_request(&method, response.status().as_u16(), &route_id, start);
                response
            }
            Err(err) => {
                if let RelayError::Upstream(ref source) = err {
                    tracing::error!(route_id = %route_id, error = %source, "Upstream transfer failed");
                } else {
                    tracing::warn!(route_id = %route_id, reason = err.reason(), "Relay request rejected");
                }
                metrics::record_rejection(err.reason());
                metrics::record_request(&method, err.status().as_u16(), &route_id, start);
                err.into_response()
            }
        }
    }

    async fn relay(&self, request: RelayRequest) -> Result<Response<Body>, RelayError> {
        if !self.enabled {
            return Err(RelayError::Disabled);
        }

        let route = self.lookup_route(&request.route_id)?;

        let mut path = request.sub_path.clone();
        if let Some(query) = request.query.as_deref().filter(|q| !q.is_empty()) {
            path.push(if path.contains('?') { '&' } else { '?' });
            path.push_str(query);
        }

        if contains_traversal(&path) {
            return Err(RelayError::PathTraversal);
        }

        let url = build_upstream_url(route.origin_base(), &path);
        let upstream_headers =
            headers::build_upstream_headers(&route, &request.headers, request.client_addr);
        let body = (request.method == Method::POST).then(|| request.body.clone());

        tracing::debug!(
            route_id = %route.route_id,
            method = %request.method,
            url = %url,
            "Forwarding to origin"
        );

        let response = self
            .upstream
            .send(request.method.clone(), &url, upstream_headers, body)
            .await
            .map_err(RelayError::Upstream)?;

        let status = StatusCode::from_u16(response.status().as_u16())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        let filtering = !route.allowed_content_groups.is_empty();
        let mut client_headers = headers::filter_response_headers(response.headers());

        if filtering && status == StatusCode::OK {
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();
            let group = content::classify(&content_type);
            let allowed =
                matches!(group, Some(resolved) if route.allowed_content_groups.contains(&resolved));

            // media has no body validator: an allowed media response can
            // stream without full buffering
            if allowed && group == Some(ContentGroup::Media) {
                let stream = response.bytes_stream().map_err(std::io::Error::other);
                return Ok(emit(
                    status,
                    request.version,
                    client_headers,
                    Body::from_stream(stream),
                ));
            }

            let body = response.bytes().await.map_err(RelayError::Upstream)?;

            if let Some(resolved) = group {
                if !content::validate_body(resolved, &body) {
                    return Err(RelayError::ContentBlocked(validation_message(resolved)));
                }
            }

            if !allowed {
                let label = match group {
                    Some(resolved) => resolved.as_str().to_string(),
                    None => content::mime_subtype(&content_type),
                };
                return Err(RelayError::ContentBlocked(format!(
                    "Mimetype group \"{label}\" is not allowed."
                )));
            }

            Ok(emit(status, request.version, client_headers, Body::from(body)))
        } else if filtering && !is_filter_exempt(status) {
            let body = response.bytes().await.map_err(RelayError::Upstream)?;
            let diagnostic = sanitize::error_page_diagnostic(status.as_u16(), &body);

            client_headers.retain(|(name, _)| !name.eq_ignore_ascii_case("content-type"));
            let at = client_headers.len().saturating_sub(2);
            client_headers.insert(
                at,
                (
                    "Content-Type".to_string(),
                    HeaderValue::from_static("text/plain; charset=UTF-8"),
                ),
            );

            Ok(emit(
                status,
                request.version,
                client_headers,
                Body::from(diagnostic),
            ))
        } else {
            // unfiltered route, or exempt status: relay bytes untouched,
            // streaming without full buffering
            let stream = response.bytes_stream().map_err(std::io::Error::other);
            Ok(emit(
                status,
                request.version,
                client_headers,
                Body::from_stream(stream),
            ))
        }
    }

    fn lookup_route(&self, route_id: &str) -> Result<Arc<RouteConfig>, RelayError> {
        match self.store.lookup(route_id) {
            Ok(route) => Ok(route),
            Err(StoreError::NotFound(_)) => Err(RelayError::RouteNotFound),
            Err(err) => {
                tracing::error!(route_id = %route_id, error = %err, "Route lookup failed");
                Err(RelayError::RouteNotFound)
            }
        }
    }
}

/// Detect a parent-directory traversal sequence in the residual path.
///
/// Both the raw and the percent-decoded form are checked; either match
/// rejects the request before any upstream work.
pub fn contains_traversal(path: &str) -> bool {
    if path.contains("..") {
        return true;
    }
    let decoded = urlencoding::decode_binary(path.as_bytes());
    decoded.windows(2).any(|pair| pair == b"..")
}

/// Join the normalized origin base with the residual path.
///
/// An empty path yields the base with a trailing slash; the query string
/// has already been merged into `path` by the caller.
pub fn build_upstream_url(origin_base: &str, path: &str) -> String {
    format!("{}/{}", origin_base, path.trim_start_matches('/'))
}

/// Echo the inbound protocol version when it is one the relay recognizes,
/// else fall back to HTTP/1.1.
pub fn client_protocol(version: Version) -> Version {
    match version {
        Version::HTTP_10 | Version::HTTP_11 | Version::HTTP_2 | Version::HTTP_3 => version,
        _ => Version::HTTP_11,
    }
}

fn is_filter_exempt(status: StatusCode) -> bool {
    FILTER_EXEMPT_STATUSES.contains(&status.as_u16())
}

fn validation_message(group: ContentGroup) -> String {
    match group {
        ContentGroup::Json => "Invalid JSON or encoding.".to_string(),
        ContentGroup::Xml => "Invalid XML or encoding.".to_string(),
        _ => "Invalid UTF-8.".to_string(),
    }
}

fn emit(
    status: StatusCode,
    version: Version,
    headers: Vec<(String, HeaderValue)>,
    body: Body,
) -> Response<Body> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.version_mut() = client_protocol(version);

    let map = response.headers_mut();
    for (name, value) in headers {
        if let Ok(header_name) = HeaderName::from_bytes(name.as_bytes()) {
            map.append(header_name, value);
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::{MemoryBackend, RouteRecord};
    use std::time::Duration;

    fn engine_with(enabled: bool, records: Vec<RouteRecord>) -> RelayEngine {
        let backend = MemoryBackend::new();
        for record in records {
            backend.insert(record);
        }
        let store = Arc::new(RouteStore::new(Box::new(backend), Duration::from_secs(60)));
        let upstream = UpstreamClient::new(Duration::from_secs(15), 5).unwrap();
        RelayEngine::new(enabled, store, upstream)
    }

    fn request(route_id: &str, sub_path: &str) -> RelayRequest {
        RelayRequest {
            route_id: route_id.into(),
            sub_path: sub_path.into(),
            query: None,
            method: Method::GET,
            version: Version::HTTP_11,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            client_addr: "127.0.0.1".parse().unwrap(),
        }
    }

    #[test]
    fn test_traversal_detection() {
        assert!(contains_traversal("../etc/passwd"));
        assert!(contains_traversal("a/../b"));
        assert!(contains_traversal("a/%2e%2e/b"));
        assert!(contains_traversal("a/%2E%2E/b"));
        assert!(!contains_traversal("a/b/c"));
        assert!(!contains_traversal("a.b/c.d"));
        assert!(!contains_traversal(""));
    }

    #[test]
    fn test_upstream_url_building() {
        assert_eq!(
            build_upstream_url("http://origin.example/api", "v1/data"),
            "http://origin.example/api/v1/data"
        );
        assert_eq!(
            build_upstream_url("http://origin.example/api", "/v1/data"),
            "http://origin.example/api/v1/data"
        );
        assert_eq!(
            build_upstream_url("http://origin.example/api", ""),
            "http://origin.example/api/"
        );
        assert_eq!(
            build_upstream_url("http://origin.example", "?a=1"),
            "http://origin.example/?a=1"
        );
    }

    #[test]
    fn test_protocol_echo_and_fallback() {
        assert_eq!(client_protocol(Version::HTTP_10), Version::HTTP_10);
        assert_eq!(client_protocol(Version::HTTP_2), Version::HTTP_2);
        assert_eq!(client_protocol(Version::HTTP_09), Version::HTTP_11);
    }

    #[test]
    fn test_exempt_statuses() {
        for code in [204, 304, 301, 302, 307, 308, 202] {
            assert!(is_filter_exempt(StatusCode::from_u16(code).unwrap()));
        }
        for code in [200, 201, 203, 206, 404, 500] {
            assert!(!is_filter_exempt(StatusCode::from_u16(code).unwrap()));
        }
    }

    #[tokio::test]
    async fn test_disabled_relay_rejects_before_lookup() {
        let engine = engine_with(false, vec![]);
        let response = engine.handle(request("deadbeef", "")).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_unknown_route_rejected() {
        let engine = engine_with(true, vec![]);
        let response = engine.handle(request("deadbeef", "")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_traversal_rejected_before_upstream() {
        let id = "a".repeat(32);
        let engine = engine_with(
            true,
            vec![RouteRecord {
                route_id: id.clone(),
                // unroutable origin: reaching the upstream would fail loudly
                url: "http://192.0.2.1".into(),
                client_ip: false,
                user_agent: false,
                referrer: true,
                mimetypes: None,
            }],
        );
        let response = engine.handle(request(&id, "files/../../secret")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
