//! Threshold screening.
//!
//! A missing criterion imposes no constraint. A present criterion whose metric is
//! missing fails: the metric cannot be verified, so the symbol does not pass.

use serde::{Deserialize, Serialize};
use std::fmt;

use screener_core::StockMetrics;

/// Caller-supplied screening thresholds.
///
/// Thresholds are compared literally; nonsensical values (e.g. negative) are the
/// caller's responsibility.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScreeningCriteria {
    /// Minimum market capitalization.
    pub min_market_cap: Option<f64>,
    /// Maximum P/E ratio.
    pub max_pe_ratio: Option<f64>,
    /// Minimum return on equity.
    pub min_roe: Option<f64>,
    /// Maximum debt-to-equity multiple.
    pub max_debt_to_equity: Option<f64>,
    /// Minimum current ratio.
    pub min_current_ratio: Option<f64>,
}

impl ScreeningCriteria {
    /// Criteria with no constraints.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum market capitalization.
    #[must_use]
    pub const fn with_min_market_cap(mut self, value: f64) -> Self {
        self.min_market_cap = Some(value);
        self
    }

    /// Sets the maximum P/E ratio.
    #[must_use]
    pub const fn with_max_pe_ratio(mut self, value: f64) -> Self {
        self.max_pe_ratio = Some(value);
        self
    }

    /// Sets the minimum return on equity.
    #[must_use]
    pub const fn with_min_roe(mut self, value: f64) -> Self {
        self.min_roe = Some(value);
        self
    }

    /// Sets the maximum debt-to-equity multiple.
    #[must_use]
    pub const fn with_max_debt_to_equity(mut self, value: f64) -> Self {
        self.max_debt_to_equity = Some(value);
        self
    }

    /// Sets the minimum current ratio.
    #[must_use]
    pub const fn with_min_current_ratio(mut self, value: f64) -> Self {
        self.min_current_ratio = Some(value);
        self
    }

    /// Returns true if no criterion is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.min_market_cap.is_none()
            && self.max_pe_ratio.is_none()
            && self.min_roe.is_none()
            && self.max_debt_to_equity.is_none()
            && self.min_current_ratio.is_none()
    }

    /// The criteria that are set, in a fixed order.
    #[must_use]
    pub fn criteria(&self) -> Vec<Criterion> {
        [
            (CriterionField::MarketCap, Bound::Min, self.min_market_cap),
            (CriterionField::PeRatio, Bound::Max, self.max_pe_ratio),
            (CriterionField::Roe, Bound::Min, self.min_roe),
            (CriterionField::DebtToEquity, Bound::Max, self.max_debt_to_equity),
            (CriterionField::CurrentRatio, Bound::Min, self.min_current_ratio),
        ]
        .into_iter()
        .filter_map(|(field, bound, threshold)| {
            threshold.map(|threshold| Criterion {
                field,
                bound,
                threshold,
            })
        })
        .collect()
    }

    /// Checks every set criterion against the metrics.
    #[must_use]
    pub fn evaluate(&self, metrics: &StockMetrics) -> Verdict {
        Verdict {
            checks: self
                .criteria()
                .into_iter()
                .map(|c| (c, c.check(metrics)))
                .collect(),
        }
    }

    /// Returns true if the metrics satisfy every set criterion.
    #[must_use]
    pub fn meets(&self, metrics: &StockMetrics) -> bool {
        self.evaluate(metrics).passed()
    }
}

/// The metric a criterion constrains.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CriterionField {
    /// Market capitalization.
    MarketCap,
    /// P/E ratio.
    PeRatio,
    /// Return on equity.
    Roe,
    /// Debt-to-equity multiple.
    DebtToEquity,
    /// Current ratio.
    CurrentRatio,
}

impl CriterionField {
    /// Reads the constrained metric.
    #[must_use]
    pub const fn value(&self, metrics: &StockMetrics) -> Option<f64> {
        match self {
            Self::MarketCap => metrics.market_cap,
            Self::PeRatio => metrics.pe_ratio,
            Self::Roe => metrics.roe,
            Self::DebtToEquity => metrics.debt_to_equity,
            Self::CurrentRatio => metrics.current_ratio,
        }
    }

    /// Metric name as it appears in serialized metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MarketCap => "marketCap",
            Self::PeRatio => "peRatio",
            Self::Roe => "roe",
            Self::DebtToEquity => "debtToEquity",
            Self::CurrentRatio => "currentRatio",
        }
    }
}

/// Comparison direction of a criterion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bound {
    /// `metric >= threshold`.
    Min,
    /// `metric <= threshold`.
    Max,
}

/// One set threshold.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    /// Constrained metric.
    pub field: CriterionField,
    /// Comparison direction.
    pub bound: Bound,
    /// Threshold value.
    pub threshold: f64,
}

impl Criterion {
    /// Checks this criterion against the metrics.
    #[must_use]
    pub fn check(&self, metrics: &StockMetrics) -> CriterionOutcome {
        let Some(actual) = self.field.value(metrics) else {
            return CriterionOutcome::MissingData;
        };
        let satisfied = match self.bound {
            Bound::Min => actual >= self.threshold,
            Bound::Max => actual <= self.threshold,
        };
        if satisfied {
            CriterionOutcome::Passed
        } else {
            CriterionOutcome::Failed { actual }
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.bound {
            Bound::Min => ">=",
            Bound::Max => "<=",
        };
        write!(f, "{} {op} {}", self.field.as_str(), self.threshold)
    }
}

/// Outcome of checking one criterion.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum CriterionOutcome {
    /// The metric satisfies the threshold.
    Passed,
    /// The metric violates the threshold.
    Failed {
        /// The offending metric value.
        actual: f64,
    },
    /// The metric is absent and cannot be verified.
    MissingData,
}

impl CriterionOutcome {
    /// Returns true for [`CriterionOutcome::Passed`].
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

/// Result of screening one symbol.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Every set criterion with its outcome.
    pub checks: Vec<(Criterion, CriterionOutcome)>,
}

impl Verdict {
    /// Returns true if every check passed. Vacuously true without criteria.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|(_, outcome)| outcome.is_pass())
    }

    /// The checks that did not pass, i.e. the reasons for a failed verdict.
    pub fn failures(&self) -> impl Iterator<Item = &(Criterion, CriterionOutcome)> {
        self.checks.iter().filter(|(_, outcome)| !outcome.is_pass())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use screener_core::Symbol;

    fn metrics() -> StockMetrics {
        StockMetrics::new(Symbol::new("TEST"))
    }

    fn complete() -> StockMetrics {
        StockMetrics {
            market_cap: Some(2.6e12),
            pe_ratio: Some(25.8),
            roe: Some(0.428),
            debt_to_equity: Some(0.47),
            current_ratio: Some(1.77),
            ..metrics()
        }
    }

    #[test]
    fn test_no_criteria_always_passes() {
        let criteria = ScreeningCriteria::new();

        assert!(criteria.is_empty());
        assert!(criteria.meets(&metrics()));
        assert!(criteria.meets(&complete()));
    }

    #[test]
    fn test_missing_metric_fails_closed() {
        let criteria = ScreeningCriteria::new().with_min_roe(0.15);
        let m = StockMetrics {
            roe: None,
            ..complete()
        };

        let verdict = criteria.evaluate(&m);

        assert!(!verdict.passed());
        let failures: Vec<_> = verdict.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0.field, CriterionField::Roe);
        assert_eq!(failures[0].1, CriterionOutcome::MissingData);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let m = complete();

        assert!(ScreeningCriteria::new().with_max_pe_ratio(25.8).meets(&m));
        assert!(ScreeningCriteria::new().with_min_current_ratio(1.77).meets(&m));
        assert!(!ScreeningCriteria::new().with_max_pe_ratio(25.7).meets(&m));
        assert!(!ScreeningCriteria::new().with_min_market_cap(3e12).meets(&m));
    }

    #[test]
    fn test_every_criterion_must_pass() {
        let criteria = ScreeningCriteria::new()
            .with_min_market_cap(1e12)
            .with_max_pe_ratio(30.0)
            .with_min_roe(0.10)
            .with_max_debt_to_equity(0.5)
            .with_min_current_ratio(1.5);

        assert_eq!(criteria.criteria().len(), 5);
        assert!(criteria.meets(&complete()));

        let leveraged = StockMetrics {
            debt_to_equity: Some(1.95),
            ..complete()
        };
        let verdict = criteria.evaluate(&leveraged);
        assert!(!verdict.passed());
        assert_eq!(
            verdict.failures().map(|(c, _)| c.field).collect::<Vec<_>>(),
            vec![CriterionField::DebtToEquity]
        );
        assert_eq!(
            verdict.failures().next().unwrap().1,
            CriterionOutcome::Failed { actual: 1.95 }
        );
    }

    #[test]
    fn test_absent_criteria_ignore_missing_metrics() {
        let criteria = ScreeningCriteria::new().with_max_pe_ratio(30.0);
        let m = StockMetrics {
            pe_ratio: Some(28.0),
            ..metrics()
        };

        assert!(criteria.meets(&m));
    }

    #[test]
    fn test_thresholds_applied_literally() {
        let criteria = ScreeningCriteria::new().with_min_roe(-1.0);
        let m = StockMetrics {
            roe: Some(-0.5),
            ..metrics()
        };

        assert!(criteria.meets(&m));
    }

    #[test]
    fn test_deserialize_partial_criteria() {
        let criteria: ScreeningCriteria =
            serde_json::from_str(r#"{"minRoe": 0.1, "maxPeRatio": 30}"#).unwrap();

        assert_eq!(criteria.min_roe, Some(0.1));
        assert_eq!(criteria.max_pe_ratio, Some(30.0));
        assert_eq!(criteria.min_market_cap, None);
    }

    #[test]
    fn test_criterion_display() {
        let criteria = ScreeningCriteria::new().with_max_debt_to_equity(0.5);
        assert_eq!(criteria.criteria()[0].to_string(), "debtToEquity <= 0.5");
    }
}
