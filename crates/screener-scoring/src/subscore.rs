//! Per-metric sub-score calculators.
//!
//! Each calculator maps one metric onto `[0, 10]` and returns `None` when the
//! metric is absent, so that the aggregate skips it instead of counting a zero.

use serde::{Deserialize, Serialize};
use std::fmt;

use screener_core::StockMetrics;

/// Lowest possible sub-score.
pub const MIN_SCORE: f64 = 0.0;
/// Highest possible sub-score.
pub const MAX_SCORE: f64 = 10.0;

/// Debt/equity multiple at and above which the debt score is zero.
const DEBT_ZERO_SCORE_RATIO: f64 = 1.0;
/// ROE (and net margin) at and above which the score saturates.
const FULL_MARKS_RETURN: f64 = 0.10;
/// Current ratio with the best liquidity score.
const LIQUIDITY_TARGET: f64 = 2.0;
/// Points lost per unit of distance from the liquidity target.
const LIQUIDITY_PENALTY: f64 = 2.0;
/// Fair P/E band.
const PE_FAIR_LOW: f64 = 10.0;
const PE_FAIR_HIGH: f64 = 20.0;
/// Score for a positive P/E below the fair band.
const PE_CHEAP_SCORE: f64 = 8.0;
/// P/E points above the fair band that cost one score point.
const PE_POINTS_PER_PENALTY: f64 = 5.0;

/// The metric category a sub-score rates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubScoreKind {
    /// Leverage, from debt-to-equity. Lower debt scores higher.
    Debt,
    /// Return on equity. Higher scores higher.
    Roe,
    /// Liquidity, from the current ratio. Peaks at 2.0.
    Liquidity,
    /// Valuation, from the P/E ratio. Peaks in the 10-20 band.
    Pe,
    /// Profitability, from net profit margin. Higher scores higher.
    Profit,
}

impl SubScoreKind {
    /// All kinds, in aggregation order.
    pub const ALL: [Self; 5] = [
        Self::Debt,
        Self::Roe,
        Self::Liquidity,
        Self::Pe,
        Self::Profit,
    ];

    /// Short name (`"debt"`, `"roe"`, ...).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debt => "debt",
            Self::Roe => "roe",
            Self::Liquidity => "liquidity",
            Self::Pe => "pe",
            Self::Profit => "profit",
        }
    }

    /// Field name used by the score breakdown API (`"debt_score"`, ...).
    #[must_use]
    pub const fn field_name(&self) -> &'static str {
        match self {
            Self::Debt => "debt_score",
            Self::Roe => "roe_score",
            Self::Liquidity => "liquidity_score",
            Self::Pe => "pe_score",
            Self::Profit => "profit_score",
        }
    }

    /// The metric this kind is computed from.
    #[must_use]
    pub const fn source(&self, metrics: &StockMetrics) -> Option<f64> {
        match self {
            Self::Debt => metrics.debt_to_equity,
            Self::Roe => metrics.roe,
            Self::Liquidity => metrics.current_ratio,
            Self::Pe => metrics.pe_ratio,
            Self::Profit => metrics.profit_margin,
        }
    }

    /// Scores the source metric, or `None` when it is absent.
    #[must_use]
    pub fn score(&self, metrics: &StockMetrics) -> Option<SubScore> {
        let source = self.source(metrics);
        let value = match self {
            Self::Debt => debt_score(source),
            Self::Roe => roe_score(source),
            Self::Liquidity => liquidity_score(source),
            Self::Pe => pe_score(source),
            Self::Profit => profit_score(source),
        }?;
        Some(SubScore::new(*self, value))
    }
}

impl fmt::Display for SubScoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One 0-10 rating.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubScore {
    /// What was rated.
    pub name: SubScoreKind,
    /// Rating in `[0, 10]`.
    pub value: f64,
}

impl SubScore {
    /// Creates a sub-score, clamping the value into `[0, 10]`.
    ///
    /// NaN maps to [`MIN_SCORE`].
    #[must_use]
    pub fn new(name: SubScoreKind, value: f64) -> Self {
        Self {
            name,
            value: clamp_score(value),
        }
    }
}

fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        MIN_SCORE
    } else {
        value.clamp(MIN_SCORE, MAX_SCORE)
    }
}

/// Debt score: 10 at zero debt, falling linearly to 0 at a debt/equity multiple of 1.0.
///
/// A negative multiple means negative equity and scores 0.
#[must_use]
pub fn debt_score(debt_to_equity: Option<f64>) -> Option<f64> {
    let de = debt_to_equity?;
    if de < 0.0 {
        return Some(MIN_SCORE);
    }
    Some(clamp_score(
        MAX_SCORE * (1.0 - de / DEBT_ZERO_SCORE_RATIO),
    ))
}

/// ROE score: linear from 0 at 0% to 10 at 10% and above. Negative ROE scores 0.
#[must_use]
pub fn roe_score(roe: Option<f64>) -> Option<f64> {
    roe.map(|r| clamp_score(MAX_SCORE * r / FULL_MARKS_RETURN))
}

/// Liquidity score: a tent peaking at a current ratio of 2.0.
///
/// Both illiquidity (below 1.0 scores under 8) and idle capital (far above the
/// target) are penalized.
#[must_use]
pub fn liquidity_score(current_ratio: Option<f64>) -> Option<f64> {
    current_ratio
        .map(|cr| clamp_score(MAX_SCORE - (cr - LIQUIDITY_TARGET).abs() * LIQUIDITY_PENALTY))
}

/// P/E score: negative or zero earnings yield 0, cheap stocks 8, the 10-20 band 10,
/// and expensive stocks lose a point per 5 P/E points above 20.
#[must_use]
pub fn pe_score(pe_ratio: Option<f64>) -> Option<f64> {
    let pe = pe_ratio?;
    let score = if pe <= 0.0 {
        MIN_SCORE
    } else if pe < PE_FAIR_LOW {
        PE_CHEAP_SCORE
    } else if pe <= PE_FAIR_HIGH {
        MAX_SCORE
    } else {
        MAX_SCORE - (pe - PE_FAIR_HIGH) / PE_POINTS_PER_PENALTY
    };
    Some(clamp_score(score))
}

/// Profitability score: linear from 0 at a 0% net margin to 10 at 10% and above.
#[must_use]
pub fn profit_score(profit_margin: Option<f64>) -> Option<f64> {
    profit_margin.map(|m| clamp_score(MAX_SCORE * m / FULL_MARKS_RETURN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use screener_core::Symbol;

    const EPS: f64 = 1e-9;

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("score should be present");
        assert!(
            (actual - expected).abs() < EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sweep() -> Vec<f64> {
        let mut values: Vec<f64> = (-400..=400).map(|i| f64::from(i) * 0.25).collect();
        values.extend([-1e12, -1e6, 1e6, 1e12, f64::MIN_POSITIVE, -0.0]);
        values
    }

    #[test]
    fn test_all_scores_in_range() {
        let calculators: [fn(Option<f64>) -> Option<f64>; 5] =
            [debt_score, roe_score, liquidity_score, pe_score, profit_score];

        for calc in calculators {
            for v in sweep() {
                let score = calc(Some(v)).unwrap();
                assert!(
                    (MIN_SCORE..=MAX_SCORE).contains(&score),
                    "score {score} out of range for input {v}"
                );
            }
        }
    }

    #[test]
    fn test_absent_metric_is_absent_score() {
        assert_eq!(debt_score(None), None);
        assert_eq!(roe_score(None), None);
        assert_eq!(liquidity_score(None), None);
        assert_eq!(pe_score(None), None);
        assert_eq!(profit_score(None), None);
    }

    #[test]
    fn test_debt_score_decreasing() {
        assert_close(debt_score(Some(0.0)), 10.0);
        assert_close(debt_score(Some(0.47)), 5.3);
        assert_close(debt_score(Some(1.0)), 0.0);
        assert_close(debt_score(Some(1.95)), 0.0);
        assert_close(debt_score(Some(-0.5)), 0.0);

        let mut previous = MAX_SCORE;
        for i in 0..=150 {
            let score = debt_score(Some(f64::from(i) * 0.01)).unwrap();
            assert!(score <= previous);
            previous = score;
        }
    }

    #[test]
    fn test_roe_score_increasing() {
        assert_close(roe_score(Some(-0.2)), 0.0);
        assert_close(roe_score(Some(0.0)), 0.0);
        assert_close(roe_score(Some(0.068)), 6.8);
        assert_close(roe_score(Some(0.15)), 10.0);

        let mut previous = MIN_SCORE;
        for i in -50..=50 {
            let score = roe_score(Some(f64::from(i) * 0.01)).unwrap();
            assert!(score >= previous);
            previous = score;
        }
    }

    #[test]
    fn test_liquidity_score_tent() {
        assert_close(liquidity_score(Some(2.0)), 10.0);
        assert_close(liquidity_score(Some(1.5)), 9.0);
        assert_close(liquidity_score(Some(1.0)), 8.0);
        assert_close(liquidity_score(Some(0.5)), 7.0);
        assert_close(liquidity_score(Some(3.0)), 8.0);
        assert_close(liquidity_score(Some(7.0)), 0.0);
        assert_close(liquidity_score(Some(25.0)), 0.0);

        // not monotonic: rising below the target, falling above it
        assert!(liquidity_score(Some(1.8)) > liquidity_score(Some(0.8)));
        assert!(liquidity_score(Some(2.2)) > liquidity_score(Some(4.0)));
    }

    #[test]
    fn test_pe_score_inverted_u() {
        assert_close(pe_score(Some(-12.0)), 0.0);
        assert_close(pe_score(Some(0.0)), 0.0);
        assert_close(pe_score(Some(5.0)), 8.0);
        assert_close(pe_score(Some(10.0)), 10.0);
        assert_close(pe_score(Some(20.0)), 10.0);
        assert_close(pe_score(Some(28.5)), 8.3);
        assert_close(pe_score(Some(70.0)), 0.0);
        assert_close(pe_score(Some(400.0)), 0.0);
    }

    #[test]
    fn test_profit_score_increasing() {
        assert_close(profit_score(Some(-0.1)), 0.0);
        assert_close(profit_score(Some(0.065)), 6.5);
        assert_close(profit_score(Some(0.362)), 10.0);
    }

    #[test]
    fn test_kind_scores_from_metrics() {
        let metrics = StockMetrics {
            debt_to_equity: Some(0.85),
            current_ratio: Some(1.15),
            ..StockMetrics::new(Symbol::new("7203.T"))
        };

        let debt = SubScoreKind::Debt.score(&metrics).unwrap();
        assert_eq!(debt.name, SubScoreKind::Debt);
        assert!((debt.value - 1.5).abs() < EPS);

        let liquidity = SubScoreKind::Liquidity.score(&metrics).unwrap();
        assert!((liquidity.value - 8.3).abs() < EPS);

        assert!(SubScoreKind::Roe.score(&metrics).is_none());
        assert!(SubScoreKind::Pe.score(&metrics).is_none());
    }

    #[test]
    fn test_sub_score_clamps() {
        assert_eq!(SubScore::new(SubScoreKind::Pe, 14.0).value, MAX_SCORE);
        assert_eq!(SubScore::new(SubScoreKind::Pe, -3.0).value, MIN_SCORE);
        assert_eq!(SubScore::new(SubScoreKind::Pe, f64::NAN).value, MIN_SCORE);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(SubScoreKind::Liquidity.as_str(), "liquidity");
        assert_eq!(SubScoreKind::Liquidity.field_name(), "liquidity_score");
        assert_eq!(
            serde_json::to_string(&SubScoreKind::Profit).unwrap(),
            "\"profit\""
        );
    }
}
