#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/screener/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Yahoo Finance data provider.
//!
//! This crate provides a Yahoo Finance provider that implements the
//! [`DataProvider`], [`MetricsProvider`], [`FundamentalsProvider`] and
//! [`PriceHistoryProvider`] traits from `screener-core`.
//!
//! # Features
//!
//! - Company profile and fundamentals from the quote summary API
//! - Annual income statements, balance sheets and cash flow statements
//! - Daily price history from the chart API
//! - Built-in rate limiting (5 requests per second by default)
//! - Percent-to-ratio conversion of debt to equity
//!
//! # Example
//!
//! ```no_run
//! use screener_yahoo::YahooProvider;
//! use screener_core::{MetricsProvider, Symbol};
//!
//! # async fn example() -> screener_core::Result<()> {
//! let provider = YahooProvider::new();
//! let snapshot = provider.fetch_snapshot(&Symbol::new("AAPL")).await?;
//!
//! println!("{}: P/E {:?}", snapshot.display_name(), snapshot.metrics.pe_ratio);
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use screener_core::{
    BalanceSheet, CashFlowStatement, CompanyProfile, DataProvider, FinancialStatements,
    FiscalPeriod, FundamentalsProvider, HistoryPeriod, IncomeStatement, MetricsProvider,
    OhlcvBar, PriceHistory, PriceHistoryProvider, RawMetrics, Result, ScreenerError,
    StockSnapshot, Symbol,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::debug;

/// Yahoo Finance quote summary API base URL.
const QUOTE_SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";

/// Yahoo Finance chart API base URL.
const CHART_API_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Quote summary modules needed for a snapshot.
const SNAPSHOT_MODULES: &str = "price,summaryDetail,defaultKeyStatistics,financialData,assetProfile";

/// Quote summary modules holding the annual statements.
const STATEMENT_MODULES: &str =
    "incomeStatementHistory,balanceSheetHistory,cashflowStatementHistory";

/// Default rate limit delay in milliseconds.
const DEFAULT_RATE_LIMIT_MS: u64 = 200;

/// Request timeout of the default HTTP client.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent for HTTP requests.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Provider name, also used as the cache key.
const PROVIDER_NAME: &str = "Yahoo Finance";

/// Yahoo Finance data provider.
///
/// Implements [`DataProvider`], [`MetricsProvider`], [`FundamentalsProvider`]
/// and [`PriceHistoryProvider`].
#[derive(Debug)]
pub struct YahooProvider {
    client: reqwest::Client,
    rate_limit_ms: u64,
    next_request_at: AtomicU64,
}

impl YahooProvider {
    /// Create a new Yahoo Finance provider with default settings.
    ///
    /// Uses built-in rate limiting of one request every 200ms.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rate_limit(Duration::from_millis(DEFAULT_RATE_LIMIT_MS))
    }

    /// Create a new Yahoo Finance provider with a custom HTTP client.
    ///
    /// Uses the provided client for all HTTP requests. Rate limiting
    /// is still applied.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            rate_limit_ms: DEFAULT_RATE_LIMIT_MS,
            next_request_at: AtomicU64::new(0),
        }
    }

    /// Create a new Yahoo Finance provider with custom rate limiting.
    #[must_use]
    pub fn with_rate_limit(rate_limit: Duration) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            rate_limit_ms: millis(rate_limit),
            next_request_at: AtomicU64::new(0),
        }
    }

    fn now_ms() -> u64 {
        millis(
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default(),
        )
    }

    /// Apply rate limiting before making a request.
    ///
    /// Each caller reserves the next free slot, so concurrent fetches are
    /// spaced out instead of all passing the check at once.
    async fn apply_rate_limit(&self) {
        let now = Self::now_ms();
        let slot = match self
            .next_request_at
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |next| {
                Some(next.max(now).saturating_add(self.rate_limit_ms))
            }) {
            Ok(previous) | Err(previous) => previous.max(now),
        };

        let wait_time = slot.saturating_sub(now);
        if wait_time > 0 {
            debug!("Rate limiting: waiting {}ms", wait_time);
            sleep(Duration::from_millis(wait_time)).await;
        }
    }

    /// Build the quote summary URL for a symbol and a set of modules.
    fn build_quote_summary_url(symbol: &Symbol, modules: &str) -> String {
        format!(
            "{}/{}?modules={}",
            QUOTE_SUMMARY_URL,
            symbol.as_str(),
            modules
        )
    }

    /// Build the chart API URL for a symbol and lookback period.
    fn build_chart_url(symbol: &Symbol, period: HistoryPeriod) -> String {
        format!(
            "{}/{}?range={}&interval=1d&includeAdjustedClose=true",
            CHART_API_URL,
            symbol.as_str(),
            period.as_str()
        )
    }

    /// Rate-limited GET that maps HTTP failures onto [`ScreenerError`].
    async fn get_json<T: DeserializeOwned>(&self, symbol: &Symbol, url: &str) -> Result<T> {
        self.apply_rate_limit().await;
        debug!("Fetching {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ScreenerError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ScreenerError::RateLimited {
                provider: PROVIDER_NAME.to_string(),
                retry_after: Some(Duration::from_secs(60)),
            });
        }

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ScreenerError::SymbolNotFound(symbol.to_string()));
        }

        if !response.status().is_success() {
            return Err(ScreenerError::Network(format!(
                "HTTP {} for {}",
                response.status(),
                symbol
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ScreenerError::Parse(e.to_string()))
    }

    /// Fetch the given quote summary modules for a symbol.
    async fn fetch_quote_summary(&self, symbol: &Symbol, modules: &str) -> Result<QuoteSummaryData> {
        let url = Self::build_quote_summary_url(symbol, modules);
        let response: QuoteSummaryResponse = self.get_json(symbol, &url).await?;
        Self::quote_summary_data(symbol, response)
    }

    /// Unwrap the single result of a quote summary response.
    fn quote_summary_data(symbol: &Symbol, response: QuoteSummaryResponse) -> Result<QuoteSummaryData> {
        if let Some(error) = response.quote_summary.error {
            return Err(api_error(symbol, error));
        }

        response
            .quote_summary
            .result
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| ScreenerError::SymbolNotFound(symbol.to_string()))
    }

    /// Convert quote summary modules into a snapshot.
    fn parse_snapshot(symbol: &Symbol, data: QuoteSummaryData) -> Result<StockSnapshot> {
        if data.price.is_none() && data.financial_data.is_none() && data.summary_detail.is_none() {
            return Err(ScreenerError::DataNotAvailable(symbol.to_string()));
        }

        let price = data.price.unwrap_or_default();
        let detail = data.summary_detail.unwrap_or_default();
        let stats = data.default_key_statistics.unwrap_or_default();
        let financial = data.financial_data.unwrap_or_default();
        let asset = data.asset_profile.unwrap_or_default();

        let profile = CompanyProfile {
            name: price.long_name.or(price.short_name),
            sector: asset.sector,
            industry: asset.industry,
        };

        let metrics = RawMetrics {
            market_cap: Value::raw(price.market_cap.as_ref())
                .or(Value::raw(detail.market_cap.as_ref())),
            pe_ratio: Value::raw(detail.forward_pe.as_ref())
                .or(Value::raw(stats.forward_pe.as_ref()))
                .or(Value::raw(detail.trailing_pe.as_ref())),
            pb_ratio: Value::raw(stats.price_to_book.as_ref()),
            peg_ratio: Value::raw(stats.peg_ratio.as_ref()),
            roe: Value::raw(financial.return_on_equity.as_ref()),
            roa: Value::raw(financial.return_on_assets.as_ref()),
            debt_to_equity: Value::raw(financial.debt_to_equity.as_ref()).map(|pct| pct / 100.0),
            current_ratio: Value::raw(financial.current_ratio.as_ref()),
            quick_ratio: Value::raw(financial.quick_ratio.as_ref()),
            gross_margin: Value::raw(financial.gross_margins.as_ref()),
            operating_margin: Value::raw(financial.operating_margins.as_ref()),
            profit_margin: Value::raw(financial.profit_margins.as_ref()),
            dividend_yield: Value::raw(detail.dividend_yield.as_ref()),
        };

        Ok(StockSnapshot::new(symbol.clone(), profile, metrics))
    }

    /// Convert the statement history modules into typed statements.
    fn parse_financials(symbol: &Symbol, data: QuoteSummaryData) -> Result<FinancialStatements> {
        let income = data
            .income_statement_history
            .map(|h| h.income_statement_history)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|row| {
                let items = IncomeStatement {
                    revenue: Value::raw(row.total_revenue.as_ref()),
                    cost_of_revenue: Value::raw(row.cost_of_revenue.as_ref()),
                    gross_profit: Value::raw(row.gross_profit.as_ref()),
                    operating_income: Value::raw(row.operating_income.as_ref()),
                    net_income: Value::raw(row.net_income.as_ref()),
                    ebit: Value::raw(row.ebit.as_ref()),
                };
                fiscal_period(row.end_date.as_ref(), items)
            })
            .collect();

        let balance_sheet = data
            .balance_sheet_history
            .map(|h| h.balance_sheet_statements)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|row| {
                let long_term_debt = Value::raw(row.long_term_debt.as_ref());
                let short_term_debt = Value::raw(row.short_long_term_debt.as_ref());
                let items = BalanceSheet {
                    total_assets: Value::raw(row.total_assets.as_ref()),
                    current_assets: Value::raw(row.total_current_assets.as_ref()),
                    cash_and_equivalents: Value::raw(row.cash.as_ref()),
                    total_liabilities: Value::raw(row.total_liab.as_ref()),
                    current_liabilities: Value::raw(row.total_current_liabilities.as_ref()),
                    long_term_debt,
                    short_term_debt,
                    total_debt: long_term_debt.zip(short_term_debt).map(|(l, s)| l + s),
                    stockholders_equity: Value::raw(row.total_stockholder_equity.as_ref()),
                };
                fiscal_period(row.end_date.as_ref(), items)
            })
            .collect();

        let cash_flow = data
            .cashflow_statement_history
            .map(|h| h.cashflow_statements)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|row| {
                let operating = Value::raw(row.total_cash_from_operating_activities.as_ref());
                let capex = Value::raw(row.capital_expenditures.as_ref());
                let items = CashFlowStatement {
                    operating_cash_flow: operating,
                    investing_cash_flow: Value::raw(
                        row.total_cashflows_from_investing_activities.as_ref(),
                    ),
                    financing_cash_flow: Value::raw(
                        row.total_cash_from_financing_activities.as_ref(),
                    ),
                    capital_expenditures: capex,
                    free_cash_flow: operating.zip(capex).map(|(o, c)| o + c),
                    dividends_paid: Value::raw(row.dividends_paid.as_ref()),
                };
                fiscal_period(row.end_date.as_ref(), items)
            })
            .collect();

        let statements = FinancialStatements {
            income,
            balance_sheet,
            cash_flow,
            ..FinancialStatements::new(symbol.clone())
        };

        if statements.is_empty() {
            return Err(ScreenerError::DataNotAvailable(symbol.to_string()));
        }

        Ok(statements.sorted())
    }

    /// Convert a chart response into daily bars.
    fn parse_chart(
        symbol: &Symbol,
        period: HistoryPeriod,
        response: ChartResponse,
    ) -> Result<PriceHistory> {
        if let Some(error) = response.chart.error {
            return Err(api_error(symbol, error));
        }

        let result = response
            .chart
            .result
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| ScreenerError::SymbolNotFound(symbol.to_string()))?;

        let timestamps = result.timestamp.unwrap_or_default();
        if timestamps.is_empty() {
            return Err(ScreenerError::DataNotAvailable(symbol.to_string()));
        }

        let quote = result
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| ScreenerError::Parse("Missing quote data".to_string()))?;

        let adj_close = result
            .indicators
            .adjclose
            .and_then(|ac| ac.into_iter().next())
            .map(|ac| ac.adjclose)
            .unwrap_or_default();

        let bars: Vec<OhlcvBar> = timestamps
            .iter()
            .enumerate()
            .filter_map(|(i, &ts)| {
                let timestamp = Utc.timestamp_opt(ts, 0).single()?;
                let bar = OhlcvBar::new(
                    timestamp,
                    value_at(&quote.open, i)?,
                    value_at(&quote.high, i)?,
                    value_at(&quote.low, i)?,
                    value_at(&quote.close, i)?,
                    quote.volume.get(i).copied().flatten().unwrap_or(0),
                );
                Some(match value_at(&adj_close, i) {
                    Some(adjusted) => bar.with_adjusted_close(adjusted),
                    None => bar,
                })
            })
            .collect();

        if bars.is_empty() {
            return Err(ScreenerError::DataNotAvailable(symbol.to_string()));
        }

        Ok(PriceHistory::new(symbol.clone(), period, bars))
    }
}

fn value_at(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Map an API-level error body.
fn api_error(symbol: &Symbol, error: ApiError) -> ScreenerError {
    if error.code == "Not Found" {
        return ScreenerError::SymbolNotFound(symbol.to_string());
    }
    ScreenerError::Other(format!("{}: {}", error.code, error.description))
}

/// Key a statement row by its end date; rows without one are dropped.
fn fiscal_period<T>(end_date: Option<&Timestamp>, items: T) -> Option<FiscalPeriod<T>> {
    let end: DateTime<Utc> = Utc.timestamp_opt(end_date?.raw?, 0).single()?;
    let date = end.date_naive();
    Some(FiscalPeriod::new(date.year(), items).with_period_end(date))
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn description(&self) -> &str {
        "Yahoo Finance provider for company profiles, fundamentals and price history"
    }
}

#[async_trait]
impl MetricsProvider for YahooProvider {
    async fn fetch_snapshot(&self, symbol: &Symbol) -> Result<StockSnapshot> {
        let data = self.fetch_quote_summary(symbol, SNAPSHOT_MODULES).await?;
        let snapshot = Self::parse_snapshot(symbol, data)?;
        debug!(
            "Fetched {} with {} metrics",
            symbol,
            snapshot.normalized().present_count()
        );
        Ok(snapshot)
    }
}

#[async_trait]
impl FundamentalsProvider for YahooProvider {
    async fn fetch_financials(&self, symbol: &Symbol) -> Result<FinancialStatements> {
        let data = self.fetch_quote_summary(symbol, STATEMENT_MODULES).await?;
        let statements = Self::parse_financials(symbol, data)?;
        debug!(
            "Fetched {} income, {} balance sheet and {} cash flow periods for {}",
            statements.income.len(),
            statements.balance_sheet.len(),
            statements.cash_flow.len(),
            symbol
        );
        Ok(statements)
    }
}

#[async_trait]
impl PriceHistoryProvider for YahooProvider {
    async fn fetch_history(&self, symbol: &Symbol, period: HistoryPeriod) -> Result<PriceHistory> {
        let url = Self::build_chart_url(symbol, period);
        let response: ChartResponse = self.get_json(symbol, &url).await?;
        let history = Self::parse_chart(symbol, period, response)?;
        debug!("Fetched {} bars for {} ({})", history.bars.len(), symbol, period);
        Ok(history)
    }
}

// ============================================================================
// Yahoo Finance API Response Types
// ============================================================================

/// Quote Summary API response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResponse {
    quote_summary: QuoteSummaryResult,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResult {
    result: Option<Vec<QuoteSummaryData>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryData {
    price: Option<Price>,
    summary_detail: Option<SummaryDetail>,
    default_key_statistics: Option<KeyStatistics>,
    financial_data: Option<FinancialData>,
    asset_profile: Option<AssetProfile>,
    income_statement_history: Option<IncomeStatementHistory>,
    balance_sheet_history: Option<BalanceSheetHistory>,
    cashflow_statement_history: Option<CashflowStatementHistory>,
}

/// A formatted Yahoo number: `{"raw": 1.5, "fmt": "1.50"}`, or `{}` when unknown.
#[derive(Debug, Default, Deserialize)]
struct Value {
    raw: Option<f64>,
}

impl Value {
    fn raw(value: Option<&Self>) -> Option<f64> {
        value.and_then(|v| v.raw)
    }
}

/// A formatted Yahoo date: `{"raw": 1696032000, "fmt": "2023-09-30"}`.
#[derive(Debug, Default, Deserialize)]
struct Timestamp {
    raw: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Price {
    long_name: Option<String>,
    short_name: Option<String>,
    market_cap: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetail {
    market_cap: Option<Value>,
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<Value>,
    #[serde(rename = "forwardPE")]
    forward_pe: Option<Value>,
    dividend_yield: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyStatistics {
    #[serde(rename = "forwardPE")]
    forward_pe: Option<Value>,
    price_to_book: Option<Value>,
    peg_ratio: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinancialData {
    return_on_equity: Option<Value>,
    return_on_assets: Option<Value>,
    debt_to_equity: Option<Value>,
    current_ratio: Option<Value>,
    quick_ratio: Option<Value>,
    gross_margins: Option<Value>,
    operating_margins: Option<Value>,
    profit_margins: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssetProfile {
    sector: Option<String>,
    industry: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomeStatementHistory {
    #[serde(default)]
    income_statement_history: Vec<IncomeStatementRow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomeStatementRow {
    end_date: Option<Timestamp>,
    total_revenue: Option<Value>,
    cost_of_revenue: Option<Value>,
    gross_profit: Option<Value>,
    operating_income: Option<Value>,
    net_income: Option<Value>,
    ebit: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalanceSheetHistory {
    #[serde(default)]
    balance_sheet_statements: Vec<BalanceSheetRow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalanceSheetRow {
    end_date: Option<Timestamp>,
    total_assets: Option<Value>,
    total_current_assets: Option<Value>,
    cash: Option<Value>,
    total_liab: Option<Value>,
    total_current_liabilities: Option<Value>,
    long_term_debt: Option<Value>,
    short_long_term_debt: Option<Value>,
    total_stockholder_equity: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CashflowStatementHistory {
    #[serde(default)]
    cashflow_statements: Vec<CashflowRow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CashflowRow {
    end_date: Option<Timestamp>,
    total_cash_from_operating_activities: Option<Value>,
    total_cashflows_from_investing_activities: Option<Value>,
    total_cash_from_financing_activities: Option<Value>,
    capital_expenditures: Option<Value>,
    dividends_paid: Option<Value>,
}

/// Chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjClose>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "quoteSummary": {
            "result": [{
                "price": {
                    "longName": "Apple Inc.",
                    "shortName": "Apple",
                    "marketCap": {"raw": 2800000000000, "fmt": "2.8T"}
                },
                "summaryDetail": {
                    "trailingPE": {"raw": 30.2, "fmt": "30.20"},
                    "forwardPE": {"raw": 28.5, "fmt": "28.50"},
                    "dividendYield": {"raw": 0.0044, "fmt": "0.44%"}
                },
                "defaultKeyStatistics": {
                    "priceToBook": {"raw": 45.8, "fmt": "45.80"},
                    "pegRatio": {}
                },
                "financialData": {
                    "returnOnEquity": {"raw": 1.479, "fmt": "147.90%"},
                    "debtToEquity": {"raw": 195.0, "fmt": "195.00"},
                    "currentRatio": {"raw": 1.04, "fmt": "1.04"},
                    "profitMargins": {"raw": 0.246, "fmt": "24.60%"}
                },
                "assetProfile": {
                    "sector": "Technology",
                    "industry": "Consumer Electronics"
                }
            }],
            "error": null
        }
    }"#;

    const STATEMENTS: &str = r#"{
        "quoteSummary": {
            "result": [{
                "incomeStatementHistory": {
                    "incomeStatementHistory": [
                        {
                            "endDate": {"raw": 1664496000, "fmt": "2022-09-30"},
                            "totalRevenue": {"raw": 394328000000},
                            "netIncome": {"raw": 99803000000}
                        },
                        {
                            "endDate": {"raw": 1696032000, "fmt": "2023-09-30"},
                            "totalRevenue": {"raw": 383285000000},
                            "netIncome": {"raw": 96995000000},
                            "ebit": {}
                        },
                        {
                            "totalRevenue": {"raw": 1}
                        }
                    ]
                },
                "balanceSheetHistory": {
                    "balanceSheetStatements": [{
                        "endDate": {"raw": 1696032000, "fmt": "2023-09-30"},
                        "totalAssets": {"raw": 352755000000},
                        "longTermDebt": {"raw": 95281000000},
                        "shortLongTermDebt": {"raw": 9822000000},
                        "totalStockholderEquity": {"raw": 62146000000}
                    }]
                },
                "cashflowStatementHistory": {
                    "cashflowStatements": [{
                        "endDate": {"raw": 1696032000, "fmt": "2023-09-30"},
                        "totalCashFromOperatingActivities": {"raw": 110543000000},
                        "capitalExpenditures": {"raw": -10959000000}
                    }]
                }
            }],
            "error": null
        }
    }"#;

    const CHART: &str = r#"{
        "chart": {
            "result": [{
                "timestamp": [1704205800, 1704292200, 1704378600],
                "indicators": {
                    "quote": [{
                        "open": [187.15, null, 182.15],
                        "high": [188.44, 185.88, 183.09],
                        "low": [183.89, 183.43, 180.88],
                        "close": [185.64, 184.25, 181.91],
                        "volume": [82488700, 58414500, null]
                    }],
                    "adjclose": [{"adjclose": [184.94, 183.55, 181.22]}]
                }
            }],
            "error": null
        }
    }"#;

    fn summary(json: &str) -> Result<QuoteSummaryData> {
        let response: QuoteSummaryResponse = serde_json::from_str(json).unwrap();
        YahooProvider::quote_summary_data(&Symbol::new("AAPL"), response)
    }

    fn parse(json: &str) -> Result<StockSnapshot> {
        YahooProvider::parse_snapshot(&Symbol::new("AAPL"), summary(json)?)
    }

    fn chart(json: &str, period: HistoryPeriod) -> Result<PriceHistory> {
        let response: ChartResponse = serde_json::from_str(json).unwrap();
        YahooProvider::parse_chart(&Symbol::new("AAPL"), period, response)
    }

    #[test]
    fn test_build_quote_summary_url() {
        let url =
            YahooProvider::build_quote_summary_url(&Symbol::new("6758.t"), SNAPSHOT_MODULES);

        assert!(url.starts_with(QUOTE_SUMMARY_URL));
        assert!(url.contains("/6758.T?"));
        assert!(url.contains("financialData"));
        assert!(url.contains("assetProfile"));
    }

    #[test]
    fn test_build_chart_url() {
        let url = YahooProvider::build_chart_url(&Symbol::new("aapl"), HistoryPeriod::SixMonths);

        assert!(url.starts_with(CHART_API_URL));
        assert!(url.contains("/AAPL?"));
        assert!(url.contains("range=6mo"));
        assert!(url.contains("interval=1d"));
    }

    #[test]
    fn test_parse_quote_summary() {
        let snapshot = parse(SAMPLE).unwrap();
        let metrics = &snapshot.metrics;

        assert_eq!(snapshot.display_name(), "Apple Inc.");
        assert_eq!(snapshot.profile.sector.as_deref(), Some("Technology"));
        assert_eq!(metrics.market_cap, Some(2_800_000_000_000.0));
        assert_eq!(metrics.pe_ratio, Some(28.5));
        assert_eq!(metrics.pb_ratio, Some(45.8));
        assert_eq!(metrics.peg_ratio, None);
        assert_eq!(metrics.roe, Some(1.479));
        assert_eq!(metrics.debt_to_equity, Some(1.95));
        assert_eq!(metrics.current_ratio, Some(1.04));
        assert_eq!(metrics.operating_margin, None);
    }

    #[test]
    fn test_trailing_pe_fallback() {
        let json = r#"{"quoteSummary": {"result": [{
            "price": {"shortName": "Sony"},
            "summaryDetail": {"trailingPE": {"raw": 17.2}}
        }], "error": null}}"#;

        let snapshot = parse(json).unwrap();

        assert_eq!(snapshot.metrics.pe_ratio, Some(17.2));
        assert_eq!(snapshot.display_name(), "Sony");
    }

    #[test]
    fn test_not_found_error() {
        let json = r#"{"quoteSummary": {"result": null, "error": {
            "code": "Not Found",
            "description": "Quote not found for ticker symbol: ZZZZINVALID"
        }}}"#;

        assert!(matches!(parse(json), Err(ScreenerError::SymbolNotFound(_))));
    }

    #[test]
    fn test_empty_result_is_not_found() {
        let json = r#"{"quoteSummary": {"result": [], "error": null}}"#;

        assert!(matches!(parse(json), Err(ScreenerError::SymbolNotFound(_))));
    }

    #[test]
    fn test_no_modules_is_data_not_available() {
        let json = r#"{"quoteSummary": {"result": [{}], "error": null}}"#;

        assert!(matches!(parse(json), Err(ScreenerError::DataNotAvailable(_))));
    }

    #[test]
    fn test_parse_financials() {
        let statements =
            YahooProvider::parse_financials(&Symbol::new("AAPL"), summary(STATEMENTS).unwrap())
                .unwrap();

        // The row without an end date is dropped, the rest is newest first
        assert_eq!(statements.income.len(), 2);
        assert_eq!(statements.income[0].fiscal_year, 2023);
        assert_eq!(
            statements.income[0].period_end.map(|d| d.to_string()).as_deref(),
            Some("2023-09-30")
        );
        let income = statements.latest_income().unwrap();
        assert_eq!(income.revenue, Some(383_285_000_000.0));
        assert_eq!(income.ebit, None);

        let balance = statements.latest_balance_sheet().unwrap();
        assert_eq!(balance.total_debt, Some(105_103_000_000.0));
        assert_eq!(balance.stockholders_equity, Some(62_146_000_000.0));

        let cash_flow = statements.latest_cash_flow().unwrap();
        assert_eq!(cash_flow.free_cash_flow, Some(99_584_000_000.0));
    }

    #[test]
    fn test_financials_without_statements() {
        let json = r#"{"quoteSummary": {"result": [{
            "incomeStatementHistory": {"incomeStatementHistory": []}
        }], "error": null}}"#;

        let result = YahooProvider::parse_financials(&Symbol::new("AAPL"), summary(json).unwrap());
        assert!(matches!(result, Err(ScreenerError::DataNotAvailable(_))));
    }

    #[test]
    fn test_parse_chart() {
        let history = chart(CHART, HistoryPeriod::FiveDays).unwrap();

        // The bar with a missing open is skipped
        assert_eq!(history.period, HistoryPeriod::FiveDays);
        assert_eq!(history.bars.len(), 2);
        assert_eq!(history.bars[0].close, 185.64);
        assert_eq!(history.bars[0].volume, 82_488_700);
        assert_eq!(history.bars[0].adjusted_close, Some(184.94));
        assert_eq!(history.bars[1].volume, 0);
        assert_eq!(history.bars[1].timestamp.timestamp(), 1_704_378_600);
    }

    #[test]
    fn test_chart_errors() {
        let not_found = r#"{"chart": {"result": null, "error": {
            "code": "Not Found",
            "description": "No data found, symbol may be delisted"
        }}}"#;
        assert!(matches!(
            chart(not_found, HistoryPeriod::OneYear),
            Err(ScreenerError::SymbolNotFound(_))
        ));

        let empty = r#"{"chart": {"result": [{
            "indicators": {"quote": [{}]}
        }], "error": null}}"#;
        assert!(matches!(
            chart(empty, HistoryPeriod::OneDay),
            Err(ScreenerError::DataNotAvailable(_))
        ));
    }

    #[test]
    fn test_provider_info() {
        let provider = YahooProvider::new();

        assert_eq!(provider.name(), "Yahoo Finance");
        assert!(!provider.description().is_empty());
    }

    #[test]
    fn test_millis_saturates() {
        assert_eq!(millis(Duration::from_millis(250)), 250);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }

    #[tokio::test]
    async fn test_rate_limit_spaces_requests() {
        let provider = YahooProvider::with_rate_limit(Duration::from_millis(30));
        let start = std::time::Instant::now();

        provider.apply_rate_limit().await;
        provider.apply_rate_limit().await;
        provider.apply_rate_limit().await;

        assert!(start.elapsed() >= Duration::from_millis(55));
    }
}
