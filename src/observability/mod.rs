//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → structured log events (tracing)
//!     → metrics (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging with a request ID flowing through all subsystems
//! - Metrics are cheap (atomic increments behind the facade)
//! - Upstream error detail goes to logs only, never to clients

pub mod metrics;
