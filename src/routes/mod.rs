//! Route configuration subsystem.
//!
//! # Data Flow
//! ```text
//! Admin surface (external) writes route records
//!     → backend (routes file, or in-memory for embedding/tests)
//!     → config.rs (typed RouteConfig; malformed rows rejected here)
//!     → store.rs (TTL cache keyed by route id)
//!     → relay engine (read-only lookups)
//! ```
//!
//! # Design Decisions
//! - Loosely-typed records never reach the engine; conversion fails loudly
//!   at the store boundary
//! - Only positive lookups are cached, so newly created routes resolve
//!   immediately
//! - Cache races are tolerated; last writer wins

pub mod config;
pub mod store;

pub use config::{RouteConfig, RouteRecord};
pub use store::{FileBackend, MemoryBackend, RouteBackend, RouteStore, StoreError};
