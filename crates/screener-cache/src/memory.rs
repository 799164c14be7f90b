//! In-memory cache implementation.

use async_trait::async_trait;
use chrono::Utc;
use screener_core::{Result, SnapshotCache, StockSnapshot, Symbol};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Cache entry with timestamp for TTL-based invalidation.
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    cached_at: chrono::DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    fn is_stale(&self, ttl: Duration) -> bool {
        let age = Utc::now().signed_duration_since(self.cached_at);
        age > chrono::TimeDelta::from_std(ttl).unwrap_or(chrono::TimeDelta::MAX)
    }
}

/// Key for snapshot cache entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SnapshotKey {
    provider: String,
    symbol: Symbol,
}

impl SnapshotKey {
    fn new(provider: &str, symbol: &Symbol) -> Self {
        Self {
            provider: provider.to_string(),
            symbol: symbol.clone(),
        }
    }
}

/// Simple in-memory cache.
///
/// Snapshots are stored in a `RwLock`-protected `HashMap` and are lost when the
/// cache is dropped. Snapshots are cloned on get/put operations.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    snapshots: RwLock<HashMap<SnapshotKey, CacheEntry<StockSnapshot>>>,
}

impl InMemoryCache {
    /// Create a new empty in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached snapshots.
    pub async fn len(&self) -> usize {
        self.snapshots.read().await.len()
    }

    /// Returns true if nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.snapshots.read().await.is_empty()
    }
}

#[async_trait]
impl SnapshotCache for InMemoryCache {
    #[instrument(skip(self), fields(provider = %provider, symbol = %symbol))]
    async fn get_snapshot(
        &self,
        provider: &str,
        symbol: &Symbol,
    ) -> Result<Option<StockSnapshot>> {
        let cache = self.snapshots.read().await;
        match cache.get(&SnapshotKey::new(provider, symbol)) {
            Some(entry) => {
                debug!("Cache hit for snapshot");
                Ok(Some(entry.data.clone()))
            }
            None => {
                debug!("Cache miss for snapshot");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, snapshot), fields(provider = %provider, symbol = %snapshot.symbol))]
    async fn put_snapshot(&self, provider: &str, snapshot: &StockSnapshot) -> Result<()> {
        let mut cache = self.snapshots.write().await;
        cache.insert(
            SnapshotKey::new(provider, &snapshot.symbol),
            CacheEntry::new(snapshot.clone()),
        );
        debug!("Cached snapshot");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize> {
        let mut cache = self.snapshots.write().await;
        let before = cache.len();
        cache.retain(|_, entry| !entry.is_stale(ttl));
        let removed = before - cache.len();

        if removed > 0 {
            debug!("Invalidated {} stale cache entries", removed);
        }

        Ok(removed)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        self.snapshots.write().await.clear();
        debug!("Cleared all cache entries");
        Ok(())
    }
}
