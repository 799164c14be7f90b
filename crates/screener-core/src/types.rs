//! Core data types for per-symbol data.
//!
//! This module defines the fundamental data structures:
//!
//! - [`Symbol`] - Trading symbol/ticker
//! - [`CompanyProfile`] - Descriptive company information
//! - [`StockSnapshot`] - Everything a provider returns for one symbol

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, ScreenerError};
use crate::metrics::{RawMetrics, StockMetrics};

/// A trading symbol/ticker.
///
/// Symbols are trimmed and uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string, trimming and converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().trim().to_uppercase())
    }

    /// Creates a new symbol, rejecting blank input.
    ///
    /// # Errors
    /// Returns [`ScreenerError::InvalidRequest`] if the symbol is empty after trimming.
    pub fn try_new(s: impl Into<String>) -> Result<Self> {
        let symbol = Self::new(s);
        if symbol.0.is_empty() {
            return Err(ScreenerError::InvalidRequest(
                "symbol must not be blank".to_string(),
            ));
        }
        Ok(symbol)
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = ScreenerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::try_new(s)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Descriptive company information.
///
/// Every field is optional; providers fill in what they know.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    /// Company name (long name preferred over short name).
    pub name: Option<String>,
    /// Business sector.
    pub sector: Option<String>,
    /// Industry within the sector.
    pub industry: Option<String>,
}

impl CompanyProfile {
    /// Creates a profile with only the company name set.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Sets the sector and industry.
    #[must_use]
    pub fn with_classification(
        mut self,
        sector: impl Into<String>,
        industry: impl Into<String>,
    ) -> Self {
        self.sector = Some(sector.into());
        self.industry = Some(industry.into());
        self
    }
}

/// Everything a provider returns for one symbol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StockSnapshot {
    /// Stock symbol.
    pub symbol: Symbol,
    /// Company profile.
    pub profile: CompanyProfile,
    /// Raw, not yet normalized metrics.
    pub metrics: RawMetrics,
    /// When the provider produced this snapshot.
    pub fetched_at: DateTime<Utc>,
}

impl StockSnapshot {
    /// Creates a snapshot stamped with the current time.
    #[must_use]
    pub fn new(symbol: Symbol, profile: CompanyProfile, metrics: RawMetrics) -> Self {
        Self {
            symbol,
            profile,
            metrics,
            fetched_at: Utc::now(),
        }
    }

    /// Returns the display name, falling back to the symbol.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.profile
            .name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| self.symbol.as_str())
    }

    /// Normalizes the raw metrics of this snapshot.
    #[must_use]
    pub fn normalized(&self) -> StockMetrics {
        StockMetrics::normalize(self.symbol.clone(), &self.metrics)
    }
}
