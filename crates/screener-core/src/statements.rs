//! Financial statements: income statement, balance sheet and cash flow.
//!
//! Each statement type is its own record of optional line items, so a provider
//! that only reports some items leaves the rest as `None` instead of inventing
//! zeros. Periods are ordered most recent first.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Symbol;

/// Income statement line items for one fiscal period.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStatement {
    /// Total revenue.
    pub revenue: Option<f64>,
    /// Cost of revenue (COGS).
    pub cost_of_revenue: Option<f64>,
    /// Gross profit.
    pub gross_profit: Option<f64>,
    /// Operating income.
    pub operating_income: Option<f64>,
    /// Net income.
    pub net_income: Option<f64>,
    /// EBIT.
    pub ebit: Option<f64>,
}

/// Balance sheet line items at the end of one fiscal period.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheet {
    /// Total assets.
    pub total_assets: Option<f64>,
    /// Current assets.
    pub current_assets: Option<f64>,
    /// Cash and cash equivalents.
    pub cash_and_equivalents: Option<f64>,
    /// Total liabilities.
    pub total_liabilities: Option<f64>,
    /// Current liabilities.
    pub current_liabilities: Option<f64>,
    /// Long-term debt.
    pub long_term_debt: Option<f64>,
    /// Short-term debt, including the current part of long-term debt.
    pub short_term_debt: Option<f64>,
    /// Total debt.
    pub total_debt: Option<f64>,
    /// Stockholders' equity.
    pub stockholders_equity: Option<f64>,
}

/// Cash flow statement line items for one fiscal period.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowStatement {
    /// Operating cash flow.
    pub operating_cash_flow: Option<f64>,
    /// Investing cash flow.
    pub investing_cash_flow: Option<f64>,
    /// Financing cash flow.
    pub financing_cash_flow: Option<f64>,
    /// Capital expenditures, negative when cash leaves the company.
    pub capital_expenditures: Option<f64>,
    /// Free cash flow.
    pub free_cash_flow: Option<f64>,
    /// Dividends paid.
    pub dividends_paid: Option<f64>,
}

/// One fiscal period of a statement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiscalPeriod<T> {
    /// Fiscal year the period belongs to.
    pub fiscal_year: i32,
    /// Last day of the period, when the provider reports it.
    pub period_end: Option<NaiveDate>,
    /// Line items of the period.
    #[serde(flatten)]
    pub items: T,
}

impl<T> FiscalPeriod<T> {
    /// Creates a period identified by its fiscal year only.
    #[must_use]
    pub const fn new(fiscal_year: i32, items: T) -> Self {
        Self {
            fiscal_year,
            period_end: None,
            items,
        }
    }

    /// Sets the last day of the period.
    #[must_use]
    pub fn with_period_end(mut self, period_end: NaiveDate) -> Self {
        self.period_end = Some(period_end);
        self
    }
}

/// Annual financial statements of one company.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialStatements {
    /// Stock symbol.
    pub symbol: Symbol,
    /// Income statements, most recent first.
    pub income: Vec<FiscalPeriod<IncomeStatement>>,
    /// Balance sheets, most recent first.
    pub balance_sheet: Vec<FiscalPeriod<BalanceSheet>>,
    /// Cash flow statements, most recent first.
    pub cash_flow: Vec<FiscalPeriod<CashFlowStatement>>,
    /// When the provider produced these statements.
    pub fetched_at: DateTime<Utc>,
}

impl FinancialStatements {
    /// Creates an empty set of statements stamped with the current time.
    #[must_use]
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            income: Vec::new(),
            balance_sheet: Vec::new(),
            cash_flow: Vec::new(),
            fetched_at: Utc::now(),
        }
    }

    /// Returns true if no statement has any period.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.income.is_empty() && self.balance_sheet.is_empty() && self.cash_flow.is_empty()
    }

    /// Orders every statement most recent first.
    #[must_use]
    pub fn sorted(mut self) -> Self {
        self.income.sort_by(|a, b| b.fiscal_year.cmp(&a.fiscal_year));
        self.balance_sheet.sort_by(|a, b| b.fiscal_year.cmp(&a.fiscal_year));
        self.cash_flow.sort_by(|a, b| b.fiscal_year.cmp(&a.fiscal_year));
        self
    }

    /// The most recent income statement.
    #[must_use]
    pub fn latest_income(&self) -> Option<&IncomeStatement> {
        self.income.first().map(|p| &p.items)
    }

    /// The most recent balance sheet.
    #[must_use]
    pub fn latest_balance_sheet(&self) -> Option<&BalanceSheet> {
        self.balance_sheet.first().map(|p| &p.items)
    }

    /// The most recent cash flow statement.
    #[must_use]
    pub fn latest_cash_flow(&self) -> Option<&CashFlowStatement> {
        self.cash_flow.first().map(|p| &p.items)
    }
}
