//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, cache TTL bounded)
//! - Check addresses parse before anything tries to bind them
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before the config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::RelayConfig;

/// Route cache entries may live at most one hour.
pub const MAX_CACHE_TTL_SECS: u64 = 3600;

/// A single semantic configuration problem.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a valid socket address")]
    BadBindAddress(String),

    #[error("listener.max_connections must be greater than zero")]
    ZeroMaxConnections,

    #[error("listener.max_body_size must be greater than zero")]
    ZeroMaxBodySize,

    #[error("listener.request_timeout_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("relay.upstream_timeout_secs must be greater than zero")]
    ZeroUpstreamTimeout,

    #[error("relay.routes_file must not be empty")]
    EmptyRoutesFile,

    #[error("route_cache.ttl_secs must be between 1 and {MAX_CACHE_TTL_SECS}")]
    BadCacheTtl(u64),

    #[error("observability.metrics_address '{0}' is not a valid socket address")]
    BadMetricsAddress(String),
}

/// Check all semantic constraints, collecting every violation.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BadBindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::ZeroMaxConnections);
    }
    if config.listener.max_body_size == 0 {
        errors.push(ValidationError::ZeroMaxBodySize);
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.relay.upstream_timeout_secs == 0 {
        errors.push(ValidationError::ZeroUpstreamTimeout);
    }
    if config.relay.routes_file.trim().is_empty() {
        errors.push(ValidationError::EmptyRoutesFile);
    }

    if config.route_cache.ttl_secs == 0 || config.route_cache.ttl_secs > MAX_CACHE_TTL_SECS {
        errors.push(ValidationError::BadCacheTtl(config.route_cache.ttl_secs));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::BadMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
