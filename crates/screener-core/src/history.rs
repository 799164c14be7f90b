//! Daily price history.
//!
//! - [`HistoryPeriod`] - The accepted lookback windows (`1d` through `max`)
//! - [`OhlcvBar`] - One daily bar
//! - [`PriceHistory`] - The bars returned for one symbol and period

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, ScreenerError};
use crate::types::Symbol;

/// Lookback window of a price history request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryPeriod {
    /// One day.
    #[serde(rename = "1d")]
    OneDay,
    /// Five days.
    #[serde(rename = "5d")]
    FiveDays,
    /// One month.
    #[serde(rename = "1mo")]
    OneMonth,
    /// Three months.
    #[serde(rename = "3mo")]
    ThreeMonths,
    /// Six months.
    #[serde(rename = "6mo")]
    SixMonths,
    /// One year.
    #[default]
    #[serde(rename = "1y")]
    OneYear,
    /// Two years.
    #[serde(rename = "2y")]
    TwoYears,
    /// Five years.
    #[serde(rename = "5y")]
    FiveYears,
    /// Ten years.
    #[serde(rename = "10y")]
    TenYears,
    /// Since the first trading day of the current year.
    #[serde(rename = "ytd")]
    YearToDate,
    /// Everything the provider has.
    #[serde(rename = "max")]
    Max,
}

impl HistoryPeriod {
    /// Every period, shortest first.
    pub const ALL: [Self; 11] = [
        Self::OneDay,
        Self::FiveDays,
        Self::OneMonth,
        Self::ThreeMonths,
        Self::SixMonths,
        Self::OneYear,
        Self::TwoYears,
        Self::FiveYears,
        Self::TenYears,
        Self::YearToDate,
        Self::Max,
    ];

    /// Returns the wire name (`1d`, `5d`, `1mo`, ...).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OneDay => "1d",
            Self::FiveDays => "5d",
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
            Self::SixMonths => "6mo",
            Self::OneYear => "1y",
            Self::TwoYears => "2y",
            Self::FiveYears => "5y",
            Self::TenYears => "10y",
            Self::YearToDate => "ytd",
            Self::Max => "max",
        }
    }

    /// Calendar days covered by a fixed-length period.
    ///
    /// `None` for `ytd` and `max`, whose length depends on the date or the provider.
    #[must_use]
    pub const fn days(&self) -> Option<u32> {
        match self {
            Self::OneDay => Some(1),
            Self::FiveDays => Some(5),
            Self::OneMonth => Some(30),
            Self::ThreeMonths => Some(90),
            Self::SixMonths => Some(180),
            Self::OneYear => Some(365),
            Self::TwoYears => Some(730),
            Self::FiveYears => Some(1825),
            Self::TenYears => Some(3650),
            Self::YearToDate | Self::Max => None,
        }
    }
}

impl fmt::Display for HistoryPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryPeriod {
    type Err = ScreenerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<_> = Self::ALL.iter().map(Self::as_str).collect();
                ScreenerError::InvalidRequest(format!(
                    "invalid period '{s}', expected one of: {}",
                    valid.join(", ")
                ))
            })
    }
}

/// OHLCV (Open, High, Low, Close, Volume) bar data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OhlcvBar {
    /// Timestamp of the bar.
    pub timestamp: DateTime<Utc>,
    /// Opening price.
    pub open: f64,
    /// Highest price during the period.
    pub high: f64,
    /// Lowest price during the period.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Trading volume.
    pub volume: u64,
    /// Split/dividend adjusted closing price.
    pub adjusted_close: Option<f64>,
}

impl OhlcvBar {
    /// Creates a new OHLCV bar.
    #[must_use]
    pub const fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            adjusted_close: None,
        }
    }

    /// Sets the adjusted close price.
    #[must_use]
    pub const fn with_adjusted_close(mut self, adjusted_close: f64) -> Self {
        self.adjusted_close = Some(adjusted_close);
        self
    }
}

/// Price bars of one symbol over one period, oldest first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceHistory {
    /// Stock symbol.
    pub symbol: Symbol,
    /// Requested period.
    pub period: HistoryPeriod,
    /// Bars, oldest first.
    pub bars: Vec<OhlcvBar>,
    /// When the provider produced this history.
    pub fetched_at: DateTime<Utc>,
}

impl PriceHistory {
    /// Creates a history stamped with the current time.
    #[must_use]
    pub fn new(symbol: Symbol, period: HistoryPeriod, bars: Vec<OhlcvBar>) -> Self {
        Self {
            symbol,
            period,
            bars,
            fetched_at: Utc::now(),
        }
    }

    /// The most recent bar.
    #[must_use]
    pub fn latest(&self) -> Option<&OhlcvBar> {
        self.bars.last()
    }

    /// Close-to-close change over the whole history, as a fraction.
    #[must_use]
    pub fn total_return(&self) -> Option<f64> {
        let first = self.bars.first()?.close;
        let last = self.latest()?.close;
        (first != 0.0).then(|| last / first - 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_parse() {
        assert_eq!("1y".parse::<HistoryPeriod>().unwrap(), HistoryPeriod::OneYear);
        assert_eq!("ytd".parse::<HistoryPeriod>().unwrap(), HistoryPeriod::YearToDate);
        assert_eq!(HistoryPeriod::default(), HistoryPeriod::OneYear);

        for period in HistoryPeriod::ALL {
            assert_eq!(period.as_str().parse::<HistoryPeriod>().unwrap(), period);
        }
    }

    #[test]
    fn test_period_rejects_unknown() {
        let err = "3y".parse::<HistoryPeriod>().unwrap_err();

        assert!(matches!(err, ScreenerError::InvalidRequest(_)));
        assert!(err.to_string().contains("1d, 5d, 1mo"));
        assert!("1Y".parse::<HistoryPeriod>().is_err());
    }

    #[test]
    fn test_period_serde_uses_wire_names() {
        assert_eq!(
            serde_json::to_value(HistoryPeriod::SixMonths).unwrap(),
            "6mo"
        );
        let period: HistoryPeriod = serde_json::from_str("\"max\"").unwrap();
        assert_eq!(period, HistoryPeriod::Max);
        assert_eq!(period.days(), None);
    }

    #[test]
    fn test_total_return() {
        let bar = |close| OhlcvBar::new(Utc::now(), close, close, close, close, 100);
        let history = PriceHistory::new(
            Symbol::new("AAPL"),
            HistoryPeriod::FiveDays,
            vec![bar(100.0), bar(105.0), bar(110.0)],
        );

        assert_eq!(history.latest().map(|b| b.close), Some(110.0));
        assert!((history.total_return().unwrap() - 0.1).abs() < 1e-12);

        let empty = PriceHistory::new(Symbol::new("AAPL"), HistoryPeriod::OneDay, vec![]);
        assert_eq!(empty.total_return(), None);
    }
}
