//! Cache trait for storing fetched snapshots.
//!
//! This module defines the [`SnapshotCache`] trait that provides a unified interface
//! for caching provider snapshots between screening runs.

use async_trait::async_trait;
use std::time::Duration;

use crate::{
    error::Result,
    types::{StockSnapshot, Symbol},
};

/// Trait for caching fetched snapshots.
///
/// Implementations can store data in various backends (SQLite, in-memory, etc.)
/// to avoid repeated API calls. Entries are keyed by provider name and symbol.
#[async_trait]
pub trait SnapshotCache: Send + Sync {
    /// Retrieves a cached snapshot.
    ///
    /// Returns `Ok(Some(snapshot))` if cached, `Ok(None)` if not cached.
    async fn get_snapshot(&self, provider: &str, symbol: &Symbol)
    -> Result<Option<StockSnapshot>>;

    /// Stores a snapshot, replacing any previous entry for the same key.
    async fn put_snapshot(&self, provider: &str, snapshot: &StockSnapshot) -> Result<()>;

    /// Removes cache entries older than the specified TTL.
    ///
    /// Returns the number of entries invalidated.
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize>;

    /// Clears all cached data.
    async fn clear(&self) -> Result<()>;
}
