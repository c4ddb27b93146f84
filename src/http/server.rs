//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the relay handler
//! - Wire up middleware (tracing, timeout, limits, request ID)
//! - Decompose inbound URLs into (route id, residual path, query)
//! - Dispatch to the relay engine
//!
//! # Design Decisions
//! - The router is the host-side boundary: it only splits the URL; all
//!   policy lives in the engine
//! - The residual path is passed through still percent-encoded, so the
//!   upstream sees the caller's encoding unchanged

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::RelayConfig;
use crate::http::request::RequestIdLayer;
use crate::lifecycle::shutdown;
use crate::relay::{RelayEngine, RelayRequest};

/// Application state injected into the relay handler.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RelayEngine>,
}

/// HTTP server hosting the relay endpoint.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server around a relay engine.
    pub fn new(config: &RelayConfig, engine: Arc<RelayEngine>) -> Self {
        let state = AppState { engine };
        let router = Self::build_router(config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        Router::new()
            .route("/{route_id}", any(relay_handler))
            .route("/{route_id}/{*path}", any(relay_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )))
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_size))
            .layer(GlobalConcurrencyLimitLayer::new(
                config.listener.max_connections,
            ))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Relay handler: split the URL, buffer the body, hand off to the engine.
async fn relay_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> impl IntoResponse {
    let uri = request.uri().clone();
    let (route_id, sub_path) = split_route_path(uri.path());
    let query = uri.query().map(str::to_string);
    let method = request.method().clone();
    let version = request.version();

    let (parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read request body");
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
                .into_response();
        }
    };

    let relay_request = RelayRequest {
        route_id,
        sub_path,
        query,
        method,
        version,
        headers: parts.headers,
        body: body_bytes,
        client_addr: addr.ip(),
    };

    let response: Response = state.engine.handle(relay_request).await;
    response
}

/// Split an inbound URL path into (route id, residual path).
///
/// `/abc123/widget/data.json` yields `("abc123", "widget/data.json")`;
/// a bare `/abc123` yields an empty residual path.
fn split_route_path(path: &str) -> (String, String) {
    let trimmed = path.trim_start_matches('/');
    match trimmed.split_once('/') {
        Some((route_id, rest)) => (route_id.to_string(), rest.to_string()),
        None => (trimmed.to_string(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_route_path() {
        assert_eq!(
            split_route_path("/abc123/widget/data.json"),
            ("abc123".to_string(), "widget/data.json".to_string())
        );
        assert_eq!(
            split_route_path("/abc123"),
            ("abc123".to_string(), String::new())
        );
        assert_eq!(
            split_route_path("/abc123/"),
            ("abc123".to_string(), String::new())
        );
        assert_eq!(split_route_path("/"), (String::new(), String::new()));
    }
}
