//! Provider traits for fetching per-symbol data.
//!
//! This module defines the core provider traits:
//!
//! - [`DataProvider`] - Base trait for all data providers
//! - [`MetricsProvider`] - Company profile and raw metrics for one symbol
//! - [`FundamentalsProvider`] - Annual financial statements
//! - [`PriceHistoryProvider`] - Daily price bars over a lookback period
//!
//! Providers are plain values passed to whoever needs them (usually as
//! `Arc<dyn MetricsProvider>`), so tests can substitute their own.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::{Result, ScreenerError},
    history::{HistoryPeriod, PriceHistory},
    statements::FinancialStatements,
    types::{StockSnapshot, Symbol},
};

/// Base trait for all data providers.
pub trait DataProvider: Send + Sync + Debug {
    /// Returns the name of this provider (e.g., "Yahoo Finance").
    ///
    /// Caches key their entries by this name.
    fn name(&self) -> &str;

    /// Returns a description of this provider.
    fn description(&self) -> &str;
}

/// Provider for per-symbol metric snapshots.
#[async_trait]
pub trait MetricsProvider: DataProvider {
    /// Fetches the company profile and raw metrics for a symbol.
    ///
    /// Returns [`ScreenerError::SymbolNotFound`] for unknown symbols. A snapshot whose
    /// metrics are all missing is still a success; absence is data.
    async fn fetch_snapshot(&self, symbol: &Symbol) -> Result<StockSnapshot>;

    /// Checks if a symbol is supported by this provider.
    ///
    /// Default implementation fetches a snapshot and maps `SymbolNotFound` to `false`.
    async fn supports_symbol(&self, symbol: &Symbol) -> Result<bool> {
        match self.fetch_snapshot(symbol).await {
            Ok(_) => Ok(true),
            Err(ScreenerError::SymbolNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Provider for annual financial statements.
#[async_trait]
pub trait FundamentalsProvider: DataProvider {
    /// Fetches the income statements, balance sheets and cash flow statements of
    /// a symbol, most recent period first.
    ///
    /// Returns [`ScreenerError::DataNotAvailable`] when the provider knows the
    /// symbol but has no statement at all.
    async fn fetch_financials(&self, symbol: &Symbol) -> Result<FinancialStatements>;
}

/// Provider for historical daily prices.
#[async_trait]
pub trait PriceHistoryProvider: DataProvider {
    /// Fetches daily bars covering `period`, oldest first.
    ///
    /// Returns [`ScreenerError::DataNotAvailable`] when no bar falls inside the period.
    async fn fetch_history(&self, symbol: &Symbol, period: HistoryPeriod) -> Result<PriceHistory>;
}
