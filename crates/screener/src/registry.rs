//! Provider registry with fallback across metrics providers.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use screener_core::{
    DataProvider, FinancialStatements, FundamentalsProvider, HistoryPeriod, MetricsProvider,
    PriceHistory, PriceHistoryProvider, Result, ScreenerError, SnapshotCache, StockSnapshot,
    Symbol,
};

/// Registry for managing multiple providers with automatic fallback.
///
/// Providers are kept per data type (snapshots, statements, price history) and
/// tried in registration order until one succeeds. Snapshot lookups consult the
/// cache first, and fresh snapshots are written back under the name of the
/// provider that produced them. Statements and history are not cached.
///
/// The registry itself implements every provider trait, so it can be handed to
/// a [`Screener`](crate::Screener) like any single provider.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use screener::{InMemoryCache, MetricsProvider, ProviderRegistry, Symbol};
///
/// let registry = ProviderRegistry::with_cache(Arc::new(InMemoryCache::new()))
///     .with_fixtures()
///     .with_yahoo();
///
/// let snapshot = registry.fetch_snapshot(&Symbol::new("AAPL")).await?;
/// ```
#[derive(Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn MetricsProvider>>,
    fundamental_providers: Vec<Arc<dyn FundamentalsProvider>>,
    history_providers: Vec<Arc<dyn PriceHistoryProvider>>,
    cache: Option<Arc<dyn SnapshotCache>>,
    cache_ttl: Option<Duration>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.provider_names())
            .field(
                "fundamental_providers",
                &self
                    .fundamental_providers
                    .iter()
                    .map(|p| p.name())
                    .collect::<Vec<_>>(),
            )
            .field(
                "history_providers",
                &self
                    .history_providers
                    .iter()
                    .map(|p| p.name())
                    .collect::<Vec<_>>(),
            )
            .field("cache", &self.cache.as_ref().map(|_| "configured"))
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

impl ProviderRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new registry with a cache.
    #[must_use]
    pub fn with_cache(cache: Arc<dyn SnapshotCache>) -> Self {
        Self {
            cache: Some(cache),
            ..Default::default()
        }
    }

    /// Set the cache for this registry.
    #[must_use]
    pub fn set_cache(mut self, cache: Arc<dyn SnapshotCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Ignore cached snapshots older than `ttl`.
    #[must_use]
    pub const fn set_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Register a metrics provider.
    pub fn register(&mut self, provider: Arc<dyn MetricsProvider>) {
        debug!(provider = provider.name(), "Registering metrics provider");
        self.providers.push(provider);
    }

    /// Register a financial statements provider.
    pub fn register_fundamentals(&mut self, provider: Arc<dyn FundamentalsProvider>) {
        debug!(provider = provider.name(), "Registering fundamentals provider");
        self.fundamental_providers.push(provider);
    }

    /// Register a price history provider.
    pub fn register_history(&mut self, provider: Arc<dyn PriceHistoryProvider>) {
        debug!(provider = provider.name(), "Registering price history provider");
        self.history_providers.push(provider);
    }

    /// Register a metrics provider, builder style.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn MetricsProvider>) -> Self {
        self.register(provider);
        self
    }

    /// Names of the registered providers, in fallback order.
    #[must_use]
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    fn is_fresh(&self, snapshot: &StockSnapshot) -> bool {
        let Some(ttl) = self.cache_ttl else {
            return true;
        };
        snapshot_age(snapshot) <= ttl
    }

    async fn cached_snapshot(&self, symbol: &Symbol) -> Option<StockSnapshot> {
        let cache = self.cache.as_ref()?;

        for provider in &self.providers {
            match cache.get_snapshot(provider.name(), symbol).await {
                Ok(Some(cached)) if self.is_fresh(&cached) => {
                    debug!(
                        provider = provider.name(),
                        symbol = %symbol,
                        "Cache hit for snapshot"
                    );
                    return Some(cached);
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "Failed to read snapshot cache"
                    );
                }
            }
        }

        None
    }

    // Builder methods for easy setup with specific providers

    /// Add the offline sample data provider for snapshots, statements and history.
    #[must_use]
    pub fn with_fixtures(mut self) -> Self {
        let provider = Arc::new(screener_fixtures::FixtureProvider::new());
        self.register(provider.clone());
        self.register_fundamentals(provider.clone());
        self.register_history(provider);
        self
    }

    /// Add the Yahoo Finance provider.
    #[cfg(feature = "yahoo")]
    #[must_use]
    pub fn with_yahoo(self) -> Self {
        self.with_yahoo_provider(screener_yahoo::YahooProvider::new())
    }

    /// Add the Yahoo Finance provider with custom request spacing.
    #[cfg(feature = "yahoo")]
    #[must_use]
    pub fn with_yahoo_rate_limit(self, rate_limit: Duration) -> Self {
        self.with_yahoo_provider(screener_yahoo::YahooProvider::with_rate_limit(rate_limit))
    }

    #[cfg(feature = "yahoo")]
    fn with_yahoo_provider(mut self, provider: screener_yahoo::YahooProvider) -> Self {
        // One provider for every data type, so all requests share one rate limit
        let provider = Arc::new(provider);
        self.register(provider.clone());
        self.register_fundamentals(provider.clone());
        self.register_history(provider);
        self
    }
}

/// Logs a provider failure before the next provider is tried.
fn log_failure(provider: &str, error: &ScreenerError) {
    if error.is_symbol_scoped() {
        debug!(provider, error = %error, "Provider has no data, trying next");
    } else {
        warn!(provider, error = %error, "Provider failed, trying next");
    }
}

fn all_failed() -> ScreenerError {
    ScreenerError::Other("All providers failed with no error".to_string())
}

/// Time since the snapshot was fetched. Snapshots from the future count as new.
fn snapshot_age(snapshot: &StockSnapshot) -> Duration {
    (chrono::Utc::now() - snapshot.fetched_at)
        .to_std()
        .unwrap_or_default()
}

impl DataProvider for ProviderRegistry {
    fn name(&self) -> &str {
        "registry"
    }

    fn description(&self) -> &str {
        "Tries registered metrics providers in order behind an optional cache"
    }
}

#[async_trait]
impl MetricsProvider for ProviderRegistry {
    /// Fetch a snapshot, trying providers in order until one succeeds.
    async fn fetch_snapshot(&self, symbol: &Symbol) -> Result<StockSnapshot> {
        if self.providers.is_empty() {
            return Err(ScreenerError::ProviderNotConfigured(
                "No metrics providers registered".to_string(),
            ));
        }

        if let Some(cached) = self.cached_snapshot(symbol).await {
            return Ok(cached);
        }

        let mut last_error = None;
        for provider in &self.providers {
            debug!(
                provider = provider.name(),
                symbol = %symbol,
                "Fetching snapshot"
            );

            match provider.fetch_snapshot(symbol).await {
                Ok(snapshot) => {
                    if let Some(cache) = &self.cache {
                        if let Err(e) = cache.put_snapshot(provider.name(), &snapshot).await {
                            warn!(
                                provider = provider.name(),
                                error = %e,
                                "Failed to cache snapshot"
                            );
                        }
                    }
                    return Ok(snapshot);
                }
                Err(e) => {
                    log_failure(provider.name(), &e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(all_failed))
    }
}

#[async_trait]
impl FundamentalsProvider for ProviderRegistry {
    /// Fetch statements, trying providers in order until one succeeds.
    async fn fetch_financials(&self, symbol: &Symbol) -> Result<FinancialStatements> {
        if self.fundamental_providers.is_empty() {
            return Err(ScreenerError::ProviderNotConfigured(
                "No fundamentals providers registered".to_string(),
            ));
        }

        let mut last_error = None;
        for provider in &self.fundamental_providers {
            debug!(
                provider = provider.name(),
                symbol = %symbol,
                "Fetching financials"
            );

            match provider.fetch_financials(symbol).await {
                Ok(statements) => return Ok(statements),
                Err(e) => {
                    log_failure(provider.name(), &e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(all_failed))
    }
}

#[async_trait]
impl PriceHistoryProvider for ProviderRegistry {
    /// Fetch price history, trying providers in order until one succeeds.
    async fn fetch_history(&self, symbol: &Symbol, period: HistoryPeriod) -> Result<PriceHistory> {
        if self.history_providers.is_empty() {
            return Err(ScreenerError::ProviderNotConfigured(
                "No price history providers registered".to_string(),
            ));
        }

        let mut last_error = None;
        for provider in &self.history_providers {
            debug!(
                provider = provider.name(),
                symbol = %symbol,
                %period,
                "Fetching price history"
            );

            match provider.fetch_history(symbol, period).await {
                Ok(history) => return Ok(history),
                Err(e) => {
                    log_failure(provider.name(), &e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(all_failed))
    }
}
