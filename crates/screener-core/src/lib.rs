#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/screener/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for stock scoring and screening.
//!
//! This crate provides the foundational abstractions shared by every screener crate:
//!
//! - [`DataProvider`](provider::DataProvider) - Base trait for all providers
//! - [`MetricsProvider`](provider::MetricsProvider) - Per-symbol metric snapshots
//! - [`FundamentalsProvider`](provider::FundamentalsProvider) - Financial statements
//! - [`PriceHistoryProvider`](provider::PriceHistoryProvider) - Daily price history
//! - [`SnapshotCache`](cache::SnapshotCache) - Caching abstraction
//! - [`StockMetrics`](metrics::StockMetrics) - Normalized metrics consumed by scoring

/// Cache trait for storing fetched snapshots.
pub mod cache;
/// Error types for screener operations.
pub mod error;
/// Price history periods and bars.
pub mod history;
/// Raw and normalized financial metrics.
pub mod metrics;
/// Provider traits for fetching per-symbol data.
pub mod provider;
/// Typed financial statements.
pub mod statements;
/// Core data types (Symbol, CompanyProfile, StockSnapshot).
pub mod types;

// Re-export commonly used items at crate root
pub use cache::SnapshotCache;
pub use error::{Result, ScreenerError};
pub use history::{HistoryPeriod, OhlcvBar, PriceHistory};
pub use metrics::{RawMetrics, StockMetrics};
pub use provider::{DataProvider, FundamentalsProvider, MetricsProvider, PriceHistoryProvider};
pub use statements::{
    BalanceSheet, CashFlowStatement, FinancialStatements, FiscalPeriod, IncomeStatement,
};
pub use types::{CompanyProfile, StockSnapshot, Symbol};
