//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the relay service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address, limits).
    pub listener: ListenerConfig,

    /// Relay behavior (enabled flag, upstream bounds, route source).
    pub relay: RelaySettings,

    /// Route cache settings.
    pub route_cache: RouteCacheConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum concurrent in-flight requests (backpressure).
    pub max_connections: usize,

    /// Maximum inbound request body size in bytes.
    pub max_body_size: usize,

    /// Server-side request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
            max_body_size: 2 * 1024 * 1024, // 2MB
            request_timeout_secs: 30,
        }
    }
}

/// Relay behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelaySettings {
    /// Global relay switch; when off every request is rejected before any
    /// route lookup.
    pub enabled: bool,

    /// Upstream transfer timeout in seconds.
    pub upstream_timeout_secs: u64,

    /// Maximum redirect hops followed on the upstream side.
    pub max_redirects: usize,

    /// Path to the JSON file of route records.
    pub routes_file: String,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            upstream_timeout_secs: 15,
            max_redirects: 5,
            routes_file: "routes.json".to_string(),
        }
    }
}

/// Route cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouteCacheConfig {
    /// Cache entry lifetime in seconds; bounded to one hour.
    pub ttl_secs: u64,
}

impl Default for RouteCacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 3600 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter (e.g. "api_relay=debug,tower_http=info").
    pub log_filter: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "api_relay=info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
