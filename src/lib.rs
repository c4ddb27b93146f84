//! Same-Origin API Relay Library

pub mod config;
pub mod content;
pub mod headers;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;
pub mod routes;

pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use relay::{RelayEngine, UpstreamClient};
pub use routes::{RouteConfig, RouteStore};
