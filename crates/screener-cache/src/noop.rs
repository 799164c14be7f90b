//! No-op cache implementation.

use async_trait::async_trait;
use screener_core::{Result, SnapshotCache, StockSnapshot, Symbol};
use std::time::Duration;
use tracing::trace;

/// A no-op cache that doesn't store anything.
///
/// `get_snapshot` always returns `Ok(None)` and `put_snapshot` always returns `Ok(())`.
/// Useful for disabling caching.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl NoopCache {
    /// Create a new no-op cache.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SnapshotCache for NoopCache {
    async fn get_snapshot(
        &self,
        _provider: &str,
        _symbol: &Symbol,
    ) -> Result<Option<StockSnapshot>> {
        trace!("NoopCache: get_snapshot called, returning None");
        Ok(None)
    }

    async fn put_snapshot(&self, _provider: &str, _snapshot: &StockSnapshot) -> Result<()> {
        trace!("NoopCache: put_snapshot called, doing nothing");
        Ok(())
    }

    async fn invalidate_stale(&self, _ttl: Duration) -> Result<usize> {
        Ok(0)
    }

    async fn clear(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use screener_core::{CompanyProfile, RawMetrics};

    #[tokio::test]
    async fn test_noop_stores_nothing() {
        let cache = NoopCache::new();
        let symbol = Symbol::new("AAPL");
        let snapshot = StockSnapshot::new(
            symbol.clone(),
            CompanyProfile::default(),
            RawMetrics::default(),
        );

        cache.put_snapshot("test", &snapshot).await.unwrap();

        assert!(cache.get_snapshot("test", &symbol).await.unwrap().is_none());
        assert_eq!(
            cache.invalidate_stale(Duration::ZERO).await.unwrap(),
            0
        );
    }
}
