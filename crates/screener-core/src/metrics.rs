//! Raw and normalized financial metrics.
//!
//! Providers return [`RawMetrics`], a typed but loosely validated record: any
//! field may be missing, and values that arrive as non-numbers (strings, objects,
//! booleans) deserialize to `None` instead of failing the whole payload.
//!
//! [`StockMetrics::normalize`] turns that record into the canonical form used by
//! scoring and screening, where every present value is a finite `f64`.

use serde::de::{Deserializer, IgnoredAny};
use serde::{Deserialize, Serialize};

use crate::types::Symbol;

/// Raw per-symbol metrics as delivered by a provider.
///
/// Ratios are fractions (`0.15` is 15%) except `debt_to_equity`, which is a plain
/// multiple (`1.95` means debt is 1.95x equity). Providers must convert into these
/// units before building a record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMetrics {
    /// Market capitalization.
    #[serde(default, deserialize_with = "lenient_number")]
    pub market_cap: Option<f64>,
    /// Price-to-earnings ratio.
    #[serde(default, deserialize_with = "lenient_number")]
    pub pe_ratio: Option<f64>,
    /// Price-to-book ratio.
    #[serde(default, deserialize_with = "lenient_number")]
    pub pb_ratio: Option<f64>,
    /// Price/earnings-to-growth ratio.
    #[serde(default, deserialize_with = "lenient_number")]
    pub peg_ratio: Option<f64>,
    /// Return on equity.
    #[serde(default, deserialize_with = "lenient_number")]
    pub roe: Option<f64>,
    /// Return on assets.
    #[serde(default, deserialize_with = "lenient_number")]
    pub roa: Option<f64>,
    /// Debt-to-equity multiple.
    #[serde(default, deserialize_with = "lenient_number")]
    pub debt_to_equity: Option<f64>,
    /// Current ratio.
    #[serde(default, deserialize_with = "lenient_number")]
    pub current_ratio: Option<f64>,
    /// Quick ratio.
    #[serde(default, deserialize_with = "lenient_number")]
    pub quick_ratio: Option<f64>,
    /// Gross profit margin.
    #[serde(default, deserialize_with = "lenient_number")]
    pub gross_margin: Option<f64>,
    /// Operating profit margin.
    #[serde(default, deserialize_with = "lenient_number")]
    pub operating_margin: Option<f64>,
    /// Net profit margin.
    #[serde(default, deserialize_with = "lenient_number")]
    pub profit_margin: Option<f64>,
    /// Dividend yield.
    #[serde(default, deserialize_with = "lenient_number")]
    pub dividend_yield: Option<f64>,
}

impl RawMetrics {
    /// Returns true if no field carries a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Accepts a JSON number; anything else (null, string, object, ...) becomes `None`.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Number(f64),
        Other(IgnoredAny),
    }

    Ok(match Option::<Lenient>::deserialize(deserializer)? {
        Some(Lenient::Number(n)) => Some(n),
        Some(Lenient::Other(_)) | None => None,
    })
}

/// Normalized metrics for one symbol.
///
/// Every present value is finite. Absent values mean "unknown" and must never be
/// read as zero: scoring skips them and screening fails closed on them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockMetrics {
    /// Stock symbol.
    pub symbol: Symbol,
    /// Market capitalization.
    pub market_cap: Option<f64>,
    /// Price-to-earnings ratio.
    pub pe_ratio: Option<f64>,
    /// Price-to-book ratio.
    pub pb_ratio: Option<f64>,
    /// Price/earnings-to-growth ratio.
    pub peg_ratio: Option<f64>,
    /// Return on equity.
    pub roe: Option<f64>,
    /// Return on assets.
    pub roa: Option<f64>,
    /// Debt-to-equity multiple.
    pub debt_to_equity: Option<f64>,
    /// Current ratio.
    pub current_ratio: Option<f64>,
    /// Quick ratio.
    pub quick_ratio: Option<f64>,
    /// Gross profit margin.
    pub gross_margin: Option<f64>,
    /// Operating profit margin.
    pub operating_margin: Option<f64>,
    /// Net profit margin.
    pub profit_margin: Option<f64>,
    /// Dividend yield.
    pub dividend_yield: Option<f64>,
}

impl StockMetrics {
    /// Creates metrics for a symbol with every value absent.
    #[must_use]
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            ..Default::default()
        }
    }

    /// Normalizes a raw record: finite values are kept as-is, NaN and infinities
    /// become absent.
    #[must_use]
    pub fn normalize(symbol: Symbol, raw: &RawMetrics) -> Self {
        Self {
            symbol,
            market_cap: finite(raw.market_cap),
            pe_ratio: finite(raw.pe_ratio),
            pb_ratio: finite(raw.pb_ratio),
            peg_ratio: finite(raw.peg_ratio),
            roe: finite(raw.roe),
            roa: finite(raw.roa),
            debt_to_equity: finite(raw.debt_to_equity),
            current_ratio: finite(raw.current_ratio),
            quick_ratio: finite(raw.quick_ratio),
            gross_margin: finite(raw.gross_margin),
            operating_margin: finite(raw.operating_margin),
            profit_margin: finite(raw.profit_margin),
            dividend_yield: finite(raw.dividend_yield),
        }
    }

    /// Number of metrics that carry a value.
    #[must_use]
    pub fn present_count(&self) -> usize {
        [
            self.market_cap,
            self.pe_ratio,
            self.pb_ratio,
            self.peg_ratio,
            self.roe,
            self.roa,
            self.debt_to_equity,
            self.current_ratio,
            self.quick_ratio,
            self.gross_margin,
            self.operating_margin,
            self.profit_margin,
            self.dividend_yield,
        ]
        .iter()
        .filter(|v| v.is_some())
        .count()
    }
}

#[inline]
fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}
