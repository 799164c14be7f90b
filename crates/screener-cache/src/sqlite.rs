//! SQLite-based cache implementation.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use screener_core::{Result, ScreenerError, SnapshotCache, StockSnapshot, Symbol};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, instrument};

/// SQLite-based cache for provider snapshots.
///
/// This cache stores one JSON document per provider and symbol in a SQLite
/// database file, providing persistence across application restarts.
#[derive(Debug)]
pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl SqliteCache {
    /// Create a new SQLite cache at the given path.
    ///
    /// # Arguments
    /// * `path` - Path to the SQLite database file
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or schema creation fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| ScreenerError::Cache(e.to_string()))?;
        Self::with_connection(conn)
    }

    /// Create an in-memory SQLite cache.
    ///
    /// Useful for testing; data is lost when the cache is dropped.
    ///
    /// # Errors
    /// Returns an error if schema creation fails.
    pub fn in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| ScreenerError::Cache(e.to_string()))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS snapshot_cache (
                provider TEXT NOT NULL,
                symbol TEXT NOT NULL,
                data_json TEXT NOT NULL,
                cached_at TEXT NOT NULL,
                PRIMARY KEY (provider, symbol)
            )",
            [],
        )
        .map_err(|e| ScreenerError::Cache(e.to_string()))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_snapshot_cached_at
             ON snapshot_cache(cached_at)",
            [],
        )
        .map_err(|e| ScreenerError::Cache(e.to_string()))?;

        debug!("SQLite cache schema initialized");
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ScreenerError::Cache(e.to_string()))
    }

    /// Fixed-width timestamps so that string comparison matches time order.
    fn timestamp(at: chrono::DateTime<Utc>) -> String {
        at.to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

#[async_trait]
impl SnapshotCache for SqliteCache {
    #[instrument(skip(self), fields(provider = %provider, symbol = %symbol))]
    async fn get_snapshot(
        &self,
        provider: &str,
        symbol: &Symbol,
    ) -> Result<Option<StockSnapshot>> {
        let conn = self.lock()?;

        let result = conn
            .query_row(
                "SELECT data_json FROM snapshot_cache
                 WHERE provider = ?1 AND symbol = ?2",
                params![provider, symbol.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|e| ScreenerError::Cache(e.to_string()))?;

        match result {
            Some(json) => {
                let snapshot: StockSnapshot = serde_json::from_str(&json)
                    .map_err(|e| ScreenerError::Parse(e.to_string()))?;
                debug!("Found cached snapshot");
                Ok(Some(snapshot))
            }
            None => {
                debug!("No cached snapshot found");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, snapshot), fields(provider = %provider, symbol = %snapshot.symbol))]
    async fn put_snapshot(&self, provider: &str, snapshot: &StockSnapshot) -> Result<()> {
        let cached_at = Self::timestamp(Utc::now());
        let data_json =
            serde_json::to_string(snapshot).map_err(|e| ScreenerError::Parse(e.to_string()))?;

        let conn = self.lock()?;

        conn.execute(
            "INSERT OR REPLACE INTO snapshot_cache
             (provider, symbol, data_json, cached_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![provider, snapshot.symbol.as_str(), data_json, cached_at],
        )
        .map_err(|e| ScreenerError::Cache(e.to_string()))?;

        debug!("Cached snapshot");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize> {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        // A cutoff before the earliest representable time matches no entry
        let Some(cutoff) = Utc::now().checked_sub_signed(ttl) else {
            return Ok(0);
        };
        let cutoff_str = Self::timestamp(cutoff);

        let conn = self.lock()?;

        let deleted = conn
            .execute(
                "DELETE FROM snapshot_cache WHERE cached_at < ?1",
                params![cutoff_str],
            )
            .map_err(|e| ScreenerError::Cache(e.to_string()))?;

        if deleted > 0 {
            debug!("Invalidated {} stale cache entries", deleted);
        }

        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        let conn = self.lock()?;

        conn.execute("DELETE FROM snapshot_cache", [])
            .map_err(|e| ScreenerError::Cache(e.to_string()))?;

        debug!("Cleared all cache entries");
        Ok(())
    }
}
