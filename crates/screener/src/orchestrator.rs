//! Batch scoring and screening.

use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use screener_core::{
    FinancialStatements, FundamentalsProvider, HistoryPeriod, MetricsProvider, PriceHistory,
    PriceHistoryProvider, Result, ScreenerError, SnapshotCache, StockMetrics, StockSnapshot,
    Symbol,
};
use screener_scoring::{FinancialScore, ScreeningCriteria};

use crate::config::ScreenerConfig;
use crate::registry::ProviderRegistry;

/// Outcome for one resolved symbol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningResult {
    /// Stock symbol.
    pub symbol: Symbol,
    /// Company name, or the symbol when the provider has none.
    pub name: String,
    /// Overall financial score; `None` when no metric could be scored.
    pub score: Option<f64>,
    /// Normalized metrics the score and verdict were computed from.
    pub metrics: StockMetrics,
    /// True if every set criterion is satisfied.
    pub meets_criteria: bool,
}

impl ScreeningResult {
    /// Scores and screens one snapshot.
    #[must_use]
    pub fn evaluate(snapshot: &StockSnapshot, criteria: &ScreeningCriteria) -> Self {
        let metrics = snapshot.normalized();
        let score = FinancialScore::from_metrics(&metrics);
        let verdict = criteria.evaluate(&metrics);

        for (criterion, outcome) in verdict.failures() {
            debug!(
                symbol = %snapshot.symbol,
                criterion = %criterion,
                ?outcome,
                "Criterion not met"
            );
        }

        Self {
            symbol: snapshot.symbol.clone(),
            name: snapshot.display_name().to_string(),
            score: score.overall_score,
            metrics,
            meets_criteria: verdict.passed(),
        }
    }
}

/// Report for one screening request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningReport {
    /// Unique id of this request.
    pub request_id: Uuid,
    /// Number of symbols requested, including those that could not be resolved.
    pub total_symbols: usize,
    /// Number of results that meet the criteria.
    pub passed_symbols: usize,
    /// One result per resolved symbol, in request order.
    pub results: Vec<ScreeningResult>,
    /// Wall-clock time of the whole batch.
    pub execution_time_seconds: f64,
}

impl ScreeningReport {
    /// Results ordered by score, best first. Unscored results come last.
    ///
    /// The sort is stable, so ties keep request order.
    #[must_use]
    pub fn ranked(&self) -> Vec<&ScreeningResult> {
        let mut ranked: Vec<_> = self.results.iter().collect();
        ranked.sort_by(|a, b| match (a.score, b.score) {
            (Some(a), Some(b)) => b.total_cmp(&a),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        ranked
    }

    /// Results that meet the criteria, in request order.
    pub fn passed(&self) -> impl Iterator<Item = &ScreeningResult> {
        self.results.iter().filter(|r| r.meets_criteria)
    }
}

/// Scores and screens symbols against a metrics provider.
///
/// Symbols of a batch are fetched concurrently, at most `max_concurrency` at a
/// time. A symbol that cannot be fetched is logged and left out of the report;
/// it never fails the batch or cancels the other symbols.
///
/// Statements and price history are served by optional providers of their own.
pub struct Screener {
    provider: Arc<dyn MetricsProvider>,
    fundamentals: Option<Arc<dyn FundamentalsProvider>>,
    history: Option<Arc<dyn PriceHistoryProvider>>,
    cache: Option<Arc<dyn SnapshotCache>>,
    config: ScreenerConfig,
}

impl std::fmt::Debug for Screener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Screener")
            .field("provider", &self.provider)
            .field("fundamentals", &self.fundamentals.as_ref().map(|p| p.name()))
            .field("history", &self.history.as_ref().map(|p| p.name()))
            .field("cache", &self.cache.as_ref().map(|_| "configured"))
            .field("config", &self.config)
            .finish()
    }
}

impl Screener {
    /// Creates a screener over `provider` with the default configuration.
    #[must_use]
    pub fn new(provider: Arc<dyn MetricsProvider>) -> Self {
        Self {
            provider,
            fundamentals: None,
            history: None,
            cache: None,
            config: ScreenerConfig::default(),
        }
    }

    /// Builds the standard provider stack from a configuration.
    ///
    /// Sample data is tried first, then Yahoo Finance unless `offline` is set.
    /// Snapshots are cached in memory, or in SQLite when `cache_path` is set.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the cache cannot be opened.
    pub fn from_config(config: ScreenerConfig) -> Result<Self> {
        config.validate()?;

        let cache = Self::open_cache(&config)?;
        let registry = ProviderRegistry::with_cache(cache.clone())
            .set_cache_ttl(config.cache_ttl)
            .with_fixtures();

        #[cfg(feature = "yahoo")]
        let registry = if config.offline {
            registry
        } else {
            registry.with_yahoo_rate_limit(config.yahoo_rate_limit)
        };

        debug!(?registry, "Built provider registry");

        let registry = Arc::new(registry);
        Ok(Self::new(registry.clone())
            .with_fundamentals(registry.clone())
            .with_price_history(registry)
            .with_cache(cache)
            .with_config(config))
    }

    fn open_cache(config: &ScreenerConfig) -> Result<Arc<dyn SnapshotCache>> {
        match &config.cache_path {
            #[cfg(feature = "cache-sqlite")]
            Some(path) => Ok(Arc::new(screener_cache::SqliteCache::new(path)?)),
            #[cfg(not(feature = "cache-sqlite"))]
            Some(_) => Err(ScreenerError::Config(
                "cache_path requires the cache-sqlite feature".to_string(),
            )),
            None => Ok(Arc::new(screener_cache::InMemoryCache::new())),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: ScreenerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the provider of financial statements.
    #[must_use]
    pub fn with_fundamentals(mut self, provider: Arc<dyn FundamentalsProvider>) -> Self {
        self.fundamentals = Some(provider);
        self
    }

    /// Sets the provider of price history.
    #[must_use]
    pub fn with_price_history(mut self, provider: Arc<dyn PriceHistoryProvider>) -> Self {
        self.history = Some(provider);
        self
    }

    /// Sets the cache whose stale entries are dropped before each batch.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn SnapshotCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &ScreenerConfig {
        &self.config
    }

    /// Fetches the company profile and raw metrics for one symbol.
    ///
    /// # Errors
    /// Returns the provider's error, e.g. [`ScreenerError::SymbolNotFound`].
    pub async fn snapshot(&self, symbol: &Symbol) -> Result<StockSnapshot> {
        self.provider.fetch_snapshot(symbol).await
    }

    /// Computes the financial score of one symbol.
    ///
    /// # Errors
    /// Returns the provider's error if the symbol cannot be fetched.
    pub async fn score(&self, symbol: &Symbol) -> Result<FinancialScore> {
        let snapshot = self.snapshot(symbol).await?;
        Ok(FinancialScore::from_metrics(&snapshot.normalized()))
    }

    /// Fetches the annual financial statements of one symbol.
    ///
    /// # Errors
    /// Returns [`ScreenerError::ProviderNotConfigured`] without a fundamentals
    /// provider, otherwise the provider's error.
    pub async fn financials(&self, symbol: &Symbol) -> Result<FinancialStatements> {
        let provider = self.fundamentals.as_ref().ok_or_else(|| {
            ScreenerError::ProviderNotConfigured("No fundamentals provider configured".to_string())
        })?;
        provider.fetch_financials(symbol).await
    }

    /// Fetches daily price history of one symbol.
    ///
    /// # Errors
    /// Returns [`ScreenerError::ProviderNotConfigured`] without a price history
    /// provider, otherwise the provider's error.
    pub async fn history(&self, symbol: &Symbol, period: HistoryPeriod) -> Result<PriceHistory> {
        let provider = self.history.as_ref().ok_or_else(|| {
            ScreenerError::ProviderNotConfigured("No price history provider configured".to_string())
        })?;
        provider.fetch_history(symbol, period).await
    }

    /// Scores and screens a batch of symbols.
    ///
    /// Duplicates are allowed and screened once per occurrence. Symbols that
    /// cannot be fetched are omitted from `results` but still counted in
    /// `total_symbols`.
    ///
    /// # Errors
    /// Returns [`ScreenerError::InvalidRequest`] if the list is empty, contains a
    /// blank symbol, or exceeds `max_symbols_per_request`.
    pub async fn screen<I, S>(
        &self,
        symbols: I,
        criteria: &ScreeningCriteria,
    ) -> Result<ScreeningReport>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let start = Instant::now();
        let request_id = Uuid::new_v4();
        let symbols = self.validate(symbols)?;

        info!(
            %request_id,
            symbols = symbols.len(),
            criteria = criteria.criteria().len(),
            "Screening batch"
        );

        self.invalidate_stale().await;

        let results: Vec<ScreeningResult> = stream::iter(&symbols)
            .map(|symbol| self.screen_symbol(symbol, criteria))
            .buffered(self.config.max_concurrency.max(1))
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .flatten()
            .collect();

        let report = ScreeningReport {
            request_id,
            total_symbols: symbols.len(),
            passed_symbols: results.iter().filter(|r| r.meets_criteria).count(),
            results,
            execution_time_seconds: start.elapsed().as_secs_f64(),
        };

        info!(
            %request_id,
            total = report.total_symbols,
            resolved = report.results.len(),
            passed = report.passed_symbols,
            seconds = report.execution_time_seconds,
            "Screening complete"
        );

        Ok(report)
    }

    fn validate<I, S>(&self, symbols: I) -> Result<Vec<Symbol>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let symbols = symbols
            .into_iter()
            .map(|s| Symbol::try_new(s.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        if symbols.is_empty() {
            return Err(ScreenerError::InvalidRequest(
                "at least one symbol is required".to_string(),
            ));
        }

        if symbols.len() > self.config.max_symbols_per_request {
            return Err(ScreenerError::InvalidRequest(format!(
                "{} symbols requested, at most {} allowed",
                symbols.len(),
                self.config.max_symbols_per_request
            )));
        }

        Ok(symbols)
    }

    async fn invalidate_stale(&self) {
        let Some(cache) = &self.cache else {
            return;
        };

        match cache.invalidate_stale(self.config.cache_ttl).await {
            Ok(0) => {}
            Ok(removed) => debug!(removed, "Dropped stale snapshots"),
            Err(e) => warn!(error = %e, "Failed to invalidate snapshot cache"),
        }
    }

    async fn screen_symbol(
        &self,
        symbol: &Symbol,
        criteria: &ScreeningCriteria,
    ) -> Option<ScreeningResult> {
        match self.snapshot(symbol).await {
            Ok(snapshot) => Some(ScreeningResult::evaluate(&snapshot, criteria)),
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Skipping symbol");
                None
            }
        }
    }
}
