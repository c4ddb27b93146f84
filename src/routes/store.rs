//! Route lookup with a bounded-TTL cache.
//!
//! # Responsibilities
//! - Answer `lookup(route_id)` for the relay engine
//! - Consult the cache first; fall through to the backend on miss
//! - Cache positive hits only, for a bounded TTL
//!
//! # Design Decisions
//! - Absence is never cached: a freshly created route resolves on its
//!   first request
//! - DashMap keeps lookups lock-free on the read path; racing writers for
//!   the same key are harmless (last writer wins)
//! - The backend is re-queried on every miss, so external edits surface
//!   once the cached entry expires or is invalidated

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use thiserror::Error;

use crate::observability::metrics;
use crate::routes::config::{RouteConfig, RouteRecord};

/// Error type for route store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No route exists for the requested id.
    #[error("route '{0}' not found")]
    NotFound(String),
    /// The backend could not be read.
    #[error("route backend error: {0}")]
    Backend(#[from] std::io::Error),
    /// The backend contents could not be parsed.
    #[error("route backend parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// A persisted row failed conversion into a typed RouteConfig.
    #[error("invalid route record '{route_id}': {reason}")]
    InvalidRecord { route_id: String, reason: String },
}

/// Persistent source of raw route records.
///
/// Implementations are consulted only on cache misses; they may be as slow
/// as a file read without hurting the hot path.
pub trait RouteBackend: Send + Sync {
    /// Fetch the raw record for a route id, `None` if absent.
    fn fetch(&self, route_id: &str) -> Result<Option<RouteRecord>, StoreError>;
}

/// Backend reading route records from a JSON file.
///
/// The file holds an array of records and is owned by the external admin
/// surface; it is re-read on every fetch so edits become visible without
/// a process restart.
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RouteBackend for FileBackend {
    fn fetch(&self, route_id: &str) -> Result<Option<RouteRecord>, StoreError> {
        let content = std::fs::read_to_string(&self.path)?;
        let records: Vec<RouteRecord> = serde_json::from_str(&content)?;
        Ok(records.into_iter().find(|r| r.route_id == route_id))
    }
}

/// In-memory backend for tests and embedding.
#[derive(Default)]
pub struct MemoryBackend {
    records: DashMap<String, RouteRecord>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: RouteRecord) {
        self.records.insert(record.route_id.clone(), record);
    }

    pub fn remove(&self, route_id: &str) {
        self.records.remove(route_id);
    }
}

impl RouteBackend for MemoryBackend {
    fn fetch(&self, route_id: &str) -> Result<Option<RouteRecord>, StoreError> {
        Ok(self.records.get(route_id).map(|r| r.value().clone()))
    }
}

struct CachedRoute {
    config: Arc<RouteConfig>,
    inserted: Instant,
}

/// TTL-cached route lookup, shared by all in-flight requests.
pub struct RouteStore {
    backend: Box<dyn RouteBackend>,
    cache: DashMap<String, CachedRoute>,
    ttl: Duration,
}

impl RouteStore {
    /// Create a store over a backend with the given cache TTL.
    pub fn new(backend: Box<dyn RouteBackend>, ttl: Duration) -> Self {
        Self {
            backend,
            cache: DashMap::new(),
            ttl,
        }
    }

    /// Look up the forwarding policy for a route id.
    ///
    /// Cache first; on miss the backend is queried and only positive hits
    /// are cached.
    pub fn lookup(&self, route_id: &str) -> Result<Arc<RouteConfig>, StoreError> {
        if let Some(entry) = self.cache.get(route_id) {
            if entry.inserted.elapsed() < self.ttl {
                metrics::record_route_cache("hit");
                return Ok(entry.config.clone());
            }
        }
        metrics::record_route_cache("miss");

        let record = self
            .backend
            .fetch(route_id)?
            .ok_or_else(|| StoreError::NotFound(route_id.to_string()))?;
        let config = Arc::new(RouteConfig::try_from(record)?);

        self.cache.insert(
            route_id.to_string(),
            CachedRoute {
                config: config.clone(),
                inserted: Instant::now(),
            },
        );
        Ok(config)
    }

    /// Drop a cached entry; called by the owning collaborator on edit or
    /// delete.
    pub fn invalidate(&self, route_id: &str) {
        self.cache.remove(route_id);
    }

    /// Drop every expired cache entry.
    pub fn purge_expired(&self) {
        let ttl = self.ttl;
        self.cache.retain(|_, entry| entry.inserted.elapsed() < ttl);
    }

    /// Number of currently cached routes.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentGroup;

    fn record(id: &str, url: &str) -> RouteRecord {
        RouteRecord {
            route_id: id.into(),
            url: url.into(),
            client_ip: false,
            user_agent: true,
            referrer: true,
            mimetypes: Some(vec!["json".into()]),
        }
    }

    #[test]
    fn test_lookup_hits_backend_then_cache() {
        let backend = MemoryBackend::new();
        backend.insert(record("a".repeat(32).as_str(), "http://one.example"));
        let id = "a".repeat(32);

        let store = RouteStore::new(Box::new(backend), Duration::from_secs(60));
        let first = store.lookup(&id).unwrap();
        assert_eq!(first.allowed_content_groups, vec![ContentGroup::Json]);
        assert_eq!(store.cached_len(), 1);

        let second = store.lookup(&id).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_absence_is_not_cached() {
        let backend = MemoryBackend::new();
        let store = RouteStore::new(Box::new(backend), Duration::from_secs(60));

        let id = "b".repeat(32);
        assert!(matches!(store.lookup(&id), Err(StoreError::NotFound(_))));
        assert_eq!(store.cached_len(), 0);
    }

    #[test]
    fn test_new_route_resolves_immediately_after_miss() {
        let backend = MemoryBackend::new();
        let id = "c".repeat(32);
        let store = RouteStore::new(Box::new(backend), Duration::from_secs(60));
        assert!(store.lookup(&id).is_err());

        // a second store over a shared backend would see it; here we
        // rebuild to simulate the admin surface adding the route
        let backend = MemoryBackend::new();
        backend.insert(record(&id, "http://two.example"));
        let store = RouteStore::new(Box::new(backend), Duration::from_secs(60));
        assert!(store.lookup(&id).is_ok());
    }

    #[test]
    fn test_expired_entry_refetches() {
        let backend = MemoryBackend::new();
        let id = "d".repeat(32);
        backend.insert(record(&id, "http://three.example"));

        let store = RouteStore::new(Box::new(backend), Duration::ZERO);
        store.lookup(&id).unwrap();
        // TTL zero: the cached entry is already stale, lookup still works
        store.lookup(&id).unwrap();
    }

    #[test]
    fn test_invalidate_drops_entry() {
        let backend = MemoryBackend::new();
        let id = "e".repeat(32);
        backend.insert(record(&id, "http://four.example"));

        let store = RouteStore::new(Box::new(backend), Duration::from_secs(60));
        store.lookup(&id).unwrap();
        assert_eq!(store.cached_len(), 1);
        store.invalidate(&id);
        assert_eq!(store.cached_len(), 0);
    }

    #[test]
    fn test_malformed_row_rejected() {
        let backend = MemoryBackend::new();
        let id = "f".repeat(32);
        backend.insert(record(&id, "nonsense"));

        let store = RouteStore::new(Box::new(backend), Duration::from_secs(60));
        assert!(matches!(
            store.lookup(&id),
            Err(StoreError::InvalidRecord { .. })
        ));
        assert_eq!(store.cached_len(), 0);
    }

    #[test]
    fn test_file_backend_reads_records() {
        let path = std::env::temp_dir().join("api_relay_store_test_routes.json");
        let id = "0".repeat(32);
        let records = vec![record(&id, "http://five.example")];
        std::fs::write(&path, serde_json::to_string(&records).unwrap()).unwrap();

        let store = RouteStore::new(
            Box::new(FileBackend::new(&path)),
            Duration::from_secs(60),
        );
        let config = store.lookup(&id).unwrap();
        assert_eq!(config.origin_base(), "http://five.example");
        assert!(store.lookup("missing").is_err());

        std::fs::remove_file(&path).unwrap_or_default();
    }
}
