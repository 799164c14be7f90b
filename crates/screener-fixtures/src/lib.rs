#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/screener/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Offline sample data provider.
//!
//! # Example
//!
//! ```
//! use screener_fixtures::FixtureProvider;
//! use screener_core::{MetricsProvider, Symbol};
//!
//! # async fn example() -> screener_core::Result<()> {
//! let provider = FixtureProvider::new();
//! let snapshot = provider.fetch_snapshot(&Symbol::new("MSFT")).await?;
//! assert_eq!(snapshot.display_name(), "Microsoft Corporation");
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{Datelike, TimeDelta, Utc};
use rand::{Rng, SeedableRng, rngs::StdRng};
use screener_core::{
    BalanceSheet, CashFlowStatement, CompanyProfile, DataProvider, FinancialStatements,
    FiscalPeriod, FundamentalsProvider, HistoryPeriod, IncomeStatement, MetricsProvider,
    OhlcvBar, PriceHistory, PriceHistoryProvider, RawMetrics, Result, ScreenerError,
    StockSnapshot, Symbol,
};
use tracing::debug;

/// Everything served for one symbol.
#[derive(Debug, Clone, Default)]
struct Listing {
    profile: CompanyProfile,
    metrics: RawMetrics,
    last_price: Option<f64>,
    financials: Option<FinancialStatements>,
}

/// Fixed-table provider for snapshots, statements and price history.
///
/// Snapshots are re-stamped with the current time on every fetch.
#[derive(Debug, Clone)]
pub struct FixtureProvider {
    name: String,
    listings: BTreeMap<Symbol, Listing>,
}

impl FixtureProvider {
    /// Creates a provider serving the built-in sample universe.
    #[must_use]
    pub fn new() -> Self {
        sample_universe().into_iter().fold(
            Self::empty(),
            |provider, (symbol, last_price, profile, metrics)| {
                provider
                    .with_snapshot(symbol, profile, metrics)
                    .with_last_price(symbol, last_price)
                    .with_financials(sample_statements(Symbol::new(symbol)))
            },
        )
    }

    /// Creates a provider that knows no symbols.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            name: "fixtures".to_string(),
            listings: BTreeMap::new(),
        }
    }

    /// Renames the provider. Caches key entries by provider name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds or replaces the profile and metrics served for a symbol.
    #[must_use]
    pub fn with_snapshot(
        mut self,
        symbol: impl Into<Symbol>,
        profile: CompanyProfile,
        metrics: RawMetrics,
    ) -> Self {
        let listing = self.listings.entry(symbol.into()).or_default();
        listing.profile = profile;
        listing.metrics = metrics;
        self
    }

    /// Sets the price generated history ends near.
    #[must_use]
    pub fn with_last_price(mut self, symbol: impl Into<Symbol>, price: f64) -> Self {
        self.listings.entry(symbol.into()).or_default().last_price = Some(price);
        self
    }

    /// Adds or replaces the statements served for `statements.symbol`.
    #[must_use]
    pub fn with_financials(mut self, statements: FinancialStatements) -> Self {
        let symbol = statements.symbol.clone();
        self.listings
            .entry(symbol)
            .or_default()
            .financials = Some(statements.sorted());
        self
    }

    /// Symbols this provider can serve, in sorted order.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.listings.keys()
    }

    fn listing(&self, symbol: &Symbol) -> Result<&Listing> {
        self.listings
            .get(symbol)
            .ok_or_else(|| ScreenerError::SymbolNotFound(symbol.to_string()))
    }
}

impl Default for FixtureProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DataProvider for FixtureProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Offline sample data for development and tests"
    }
}

#[async_trait]
impl MetricsProvider for FixtureProvider {
    async fn fetch_snapshot(&self, symbol: &Symbol) -> Result<StockSnapshot> {
        let listing = self.listing(symbol)?;

        debug!("Serving fixture snapshot for {}", symbol);
        Ok(StockSnapshot::new(
            symbol.clone(),
            listing.profile.clone(),
            listing.metrics.clone(),
        ))
    }

    async fn supports_symbol(&self, symbol: &Symbol) -> Result<bool> {
        Ok(self.listings.contains_key(symbol))
    }
}

#[async_trait]
impl FundamentalsProvider for FixtureProvider {
    async fn fetch_financials(&self, symbol: &Symbol) -> Result<FinancialStatements> {
        let statements = self
            .listing(symbol)?
            .financials
            .as_ref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ScreenerError::DataNotAvailable(symbol.to_string()))?;

        debug!("Serving fixture statements for {}", symbol);
        Ok(FinancialStatements {
            fetched_at: Utc::now(),
            ..statements.clone()
        })
    }
}

#[async_trait]
impl PriceHistoryProvider for FixtureProvider {
    async fn fetch_history(&self, symbol: &Symbol, period: HistoryPeriod) -> Result<PriceHistory> {
        let last_price = self
            .listing(symbol)?
            .last_price
            .ok_or_else(|| ScreenerError::DataNotAvailable(symbol.to_string()))?;

        let bars = generate_bars(symbol, last_price, period);
        debug!("Generated {} fixture bars for {} ({})", bars.len(), symbol, period);
        Ok(PriceHistory::new(symbol.clone(), period, bars))
    }
}

/// Days of history generated for a period. `max` is capped at ten years.
fn history_days(period: HistoryPeriod) -> u32 {
    period.days().unwrap_or_else(|| match period {
        HistoryPeriod::YearToDate => Utc::now().ordinal(),
        _ => 3650,
    })
}

/// A random walk of daily bars starting at 90% of `last_price`.
///
/// Each day moves the close by up to 5% either way. The walk is seeded from the
/// symbol and period, so repeated requests return the same prices.
fn generate_bars(symbol: &Symbol, last_price: f64, period: HistoryPeriod) -> Vec<OhlcvBar> {
    let days = history_days(period);
    let seed = symbol
        .as_str()
        .bytes()
        .chain(period.as_str().bytes())
        .fold(0xcbf2_9ce4_8422_2325_u64, |hash, b| {
            (hash ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
        });
    let mut rng = StdRng::seed_from_u64(seed);

    let start = Utc::now() - TimeDelta::days(i64::from(days));
    let mut close = last_price * 0.9;

    (0..days)
        .map(|day| {
            close *= 1.0 + rng.gen_range(-0.05..0.05);
            OhlcvBar::new(
                start + TimeDelta::days(i64::from(day)),
                cents(close * 0.998),
                cents(close * 1.002),
                cents(close * 0.996),
                cents(close),
                rng.gen_range(20_000_000..80_000_000),
            )
        })
        .collect()
}

fn cents(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}

/// Three fiscal years of sample statements, shared by every sample listing.
fn sample_statements(symbol: Symbol) -> FinancialStatements {
    let income = |year: i32, revenue: f64, net_income: f64| {
        FiscalPeriod::new(
            year,
            IncomeStatement {
                revenue: Some(revenue),
                net_income: Some(net_income),
                ..Default::default()
            },
        )
    };
    let balance_sheet = |year: i32, total_assets: f64, total_debt: f64| {
        FiscalPeriod::new(
            year,
            BalanceSheet {
                total_assets: Some(total_assets),
                total_debt: Some(total_debt),
                ..Default::default()
            },
        )
    };
    let cash_flow = |year: i32, operating: f64, free: f64| {
        FiscalPeriod::new(
            year,
            CashFlowStatement {
                operating_cash_flow: Some(operating),
                free_cash_flow: Some(free),
                ..Default::default()
            },
        )
    };

    FinancialStatements {
        income: vec![
            income(2023, 383_285_000_000.0, 96_995_000_000.0),
            income(2022, 394_328_000_000.0, 99_803_000_000.0),
            income(2021, 365_817_000_000.0, 94_680_000_000.0),
        ],
        balance_sheet: vec![
            balance_sheet(2023, 352_755_000_000.0, 123_930_000_000.0),
            balance_sheet(2022, 352_583_000_000.0, 120_069_000_000.0),
        ],
        cash_flow: vec![
            cash_flow(2023, 110_543_000_000.0, 84_726_000_000.0),
            cash_flow(2022, 122_151_000_000.0, 111_443_000_000.0),
        ],
        ..FinancialStatements::new(symbol)
    }
}

/// Sample listings with their last price. Debt to equity is a plain ratio.
fn sample_universe() -> Vec<(&'static str, f64, CompanyProfile, RawMetrics)> {
    vec![
        (
            "AAPL",
            190.50,
            CompanyProfile::named("Apple Inc.")
                .with_classification("Technology", "Consumer Electronics"),
            RawMetrics {
                market_cap: Some(2_800_000_000_000.0),
                pe_ratio: Some(28.5),
                pb_ratio: Some(45.8),
                peg_ratio: Some(2.1),
                roe: Some(1.479),
                roa: Some(0.229),
                debt_to_equity: Some(1.95),
                current_ratio: Some(1.04),
                quick_ratio: Some(0.95),
                gross_margin: Some(0.381),
                operating_margin: Some(0.297),
                profit_margin: Some(0.246),
                dividend_yield: Some(0.0044),
            },
        ),
        (
            "MSFT",
            350.20,
            CompanyProfile::named("Microsoft Corporation")
                .with_classification("Technology", "Software—Infrastructure"),
            RawMetrics {
                market_cap: Some(2_600_000_000_000.0),
                pe_ratio: Some(25.8),
                pb_ratio: Some(12.5),
                peg_ratio: Some(1.8),
                roe: Some(0.428),
                roa: Some(0.168),
                debt_to_equity: Some(0.47),
                current_ratio: Some(1.77),
                quick_ratio: Some(1.75),
                gross_margin: Some(0.688),
                operating_margin: Some(0.424),
                profit_margin: Some(0.362),
                dividend_yield: Some(0.0072),
            },
        ),
        (
            "GOOGL",
            135.85,
            CompanyProfile::named("Alphabet Inc.")
                .with_classification("Technology", "Internet Content & Information"),
            RawMetrics {
                market_cap: Some(1_700_000_000_000.0),
                pe_ratio: Some(22.1),
                pb_ratio: Some(5.8),
                peg_ratio: Some(1.4),
                roe: Some(0.276),
                roa: Some(0.134),
                debt_to_equity: Some(0.148),
                current_ratio: Some(2.85),
                quick_ratio: Some(2.85),
                gross_margin: Some(0.548),
                operating_margin: Some(0.278),
                profit_margin: Some(0.211),
                dividend_yield: None,
            },
        ),
        (
            "6758.T",
            12_500.0,
            CompanyProfile::named("ソニーグループ株式会社")
                .with_classification("Technology", "Consumer Electronics"),
            RawMetrics {
                market_cap: Some(12_000_000_000_000.0),
                pe_ratio: Some(15.8),
                pb_ratio: Some(1.8),
                peg_ratio: Some(1.2),
                roe: Some(0.125),
                roa: Some(0.078),
                debt_to_equity: Some(0.42),
                current_ratio: Some(1.35),
                quick_ratio: Some(1.15),
                gross_margin: Some(0.425),
                operating_margin: Some(0.135),
                profit_margin: Some(0.098),
                dividend_yield: Some(0.006),
            },
        ),
        (
            "9984.T",
            5_850.0,
            CompanyProfile::named("ソフトバンクグループ株式会社")
                .with_classification("Technology", "Telecom Services"),
            RawMetrics {
                market_cap: Some(8_500_000_000_000.0),
                pe_ratio: Some(12.5),
                pb_ratio: Some(0.95),
                peg_ratio: Some(0.9),
                roe: Some(0.068),
                roa: Some(0.028),
                debt_to_equity: Some(1.85),
                current_ratio: Some(1.08),
                quick_ratio: Some(0.95),
                gross_margin: Some(0.385),
                operating_margin: Some(0.125),
                profit_margin: Some(0.065),
                dividend_yield: Some(0.012),
            },
        ),
        (
            "7203.T",
            2_850.0,
            CompanyProfile::named("トヨタ自動車株式会社")
                .with_classification("Consumer Cyclical", "Auto Manufacturers"),
            RawMetrics {
                market_cap: Some(25_000_000_000_000.0),
                pe_ratio: Some(9.2),
                pb_ratio: Some(0.85),
                peg_ratio: Some(0.8),
                roe: Some(0.089),
                roa: Some(0.045),
                debt_to_equity: Some(0.85),
                current_ratio: Some(1.15),
                quick_ratio: Some(0.95),
                gross_margin: Some(0.198),
                operating_margin: Some(0.089),
                profit_margin: Some(0.078),
                dividend_yield: Some(0.025),
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sample_universe() {
        let provider = FixtureProvider::new();

        assert_eq!(provider.symbols().count(), 6);

        let snapshot = provider
            .fetch_snapshot(&Symbol::new("7203.t"))
            .await
            .unwrap();
        assert_eq!(snapshot.symbol.as_str(), "7203.T");
        assert_eq!(snapshot.metrics.pe_ratio, Some(9.2));
        assert_eq!(snapshot.metrics.debt_to_equity, Some(0.85));
    }

    #[tokio::test]
    async fn test_unknown_symbol() {
        let provider = FixtureProvider::new();
        let result = provider
            .fetch_snapshot(&Symbol::new("ZZZZINVALID"))
            .await;

        assert!(matches!(result, Err(ScreenerError::SymbolNotFound(_))));
        assert!(
            !provider
                .supports_symbol(&Symbol::new("ZZZZINVALID"))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_custom_snapshot() {
        let provider = FixtureProvider::empty().with_name("stub").with_snapshot(
            "acme",
            CompanyProfile::default(),
            RawMetrics {
                roe: Some(0.2),
                ..Default::default()
            },
        );

        assert_eq!(provider.name(), "stub");
        let snapshot = provider.fetch_snapshot(&Symbol::new("ACME")).await.unwrap();
        assert_eq!(snapshot.display_name(), "ACME");
        assert_eq!(snapshot.metrics.roe, Some(0.2));
        assert!(
            FixtureProvider::empty()
                .fetch_snapshot(&Symbol::new("AAPL"))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_sample_financials() {
        let provider = FixtureProvider::new();

        let statements = provider
            .fetch_financials(&Symbol::new("msft"))
            .await
            .unwrap();

        assert_eq!(statements.symbol.as_str(), "MSFT");
        assert_eq!(statements.income.len(), 3);
        assert_eq!(statements.income[0].fiscal_year, 2023);
        assert_eq!(
            statements.latest_income().and_then(|i| i.revenue),
            Some(383_285_000_000.0)
        );
        assert_eq!(
            statements.latest_balance_sheet().and_then(|b| b.total_debt),
            Some(123_930_000_000.0)
        );
        assert_eq!(
            statements.latest_cash_flow().and_then(|c| c.free_cash_flow),
            Some(84_726_000_000.0)
        );
    }

    #[tokio::test]
    async fn test_financials_missing() {
        let provider = FixtureProvider::new().with_snapshot(
            "ACME",
            CompanyProfile::default(),
            RawMetrics::default(),
        );

        let unknown = provider.fetch_financials(&Symbol::new("ZZZZ")).await;
        assert!(matches!(unknown, Err(ScreenerError::SymbolNotFound(_))));

        let none = provider.fetch_financials(&Symbol::new("ACME")).await;
        assert!(matches!(none, Err(ScreenerError::DataNotAvailable(_))));

        let history = provider
            .fetch_history(&Symbol::new("ACME"), HistoryPeriod::OneMonth)
            .await;
        assert!(matches!(history, Err(ScreenerError::DataNotAvailable(_))));
    }

    #[tokio::test]
    async fn test_generated_history() {
        let provider = FixtureProvider::new();
        let symbol = Symbol::new("AAPL");

        let history = provider
            .fetch_history(&symbol, HistoryPeriod::ThreeMonths)
            .await
            .unwrap();

        assert_eq!(history.period, HistoryPeriod::ThreeMonths);
        assert_eq!(history.bars.len(), 90);
        assert!(
            history
                .bars
                .windows(2)
                .all(|w| w[0].timestamp < w[1].timestamp)
        );
        for bar in &history.bars {
            assert!(bar.low <= bar.open && bar.open <= bar.close && bar.close <= bar.high);
            assert!((20_000_000..80_000_000).contains(&bar.volume));
        }

        let again = provider
            .fetch_history(&symbol, HistoryPeriod::ThreeMonths)
            .await
            .unwrap();
        let closes = |h: &PriceHistory| h.bars.iter().map(|b| b.close).collect::<Vec<_>>();
        assert_eq!(closes(&history), closes(&again));
    }

    #[tokio::test]
    async fn test_history_lengths() {
        let provider = FixtureProvider::new();
        let symbol = Symbol::new("7203.T");

        for (period, expected) in [
            (HistoryPeriod::OneDay, 1),
            (HistoryPeriod::FiveDays, 5),
            (HistoryPeriod::TenYears, 3650),
            (HistoryPeriod::Max, 3650),
        ] {
            let history = provider.fetch_history(&symbol, period).await.unwrap();
            assert_eq!(history.bars.len(), expected, "{period}");
        }

        let ytd = provider
            .fetch_history(&symbol, HistoryPeriod::YearToDate)
            .await
            .unwrap();
        assert!((1..=366).contains(&ytd.bars.len()));
    }
}
