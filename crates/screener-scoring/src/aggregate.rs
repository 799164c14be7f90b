//! Overall score aggregation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use screener_core::{StockMetrics, Symbol};

use crate::subscore::{SubScore, SubScoreKind};

/// Financial health score for one symbol.
///
/// `overall_score` is the arithmetic mean of the sub-scores that could be computed.
/// When none could, it is `None` and must be shown as "N/A", not as zero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialScore {
    /// Stock symbol.
    pub symbol: Symbol,
    /// Mean of the available sub-scores, at full precision.
    pub overall_score: Option<f64>,
    /// Available sub-scores. Kinds whose metric was absent are omitted.
    pub sub_scores: BTreeMap<SubScoreKind, SubScore>,
}

impl FinancialScore {
    /// Scores normalized metrics.
    #[must_use]
    pub fn from_metrics(metrics: &StockMetrics) -> Self {
        Self::from_sub_scores(
            metrics.symbol.clone(),
            SubScoreKind::ALL.iter().filter_map(|kind| kind.score(metrics)),
        )
    }

    /// Aggregates already computed sub-scores.
    ///
    /// A later sub-score of the same kind replaces an earlier one.
    #[must_use]
    pub fn from_sub_scores(symbol: Symbol, sub_scores: impl IntoIterator<Item = SubScore>) -> Self {
        let sub_scores: BTreeMap<_, _> = sub_scores.into_iter().map(|s| (s.name, s)).collect();

        let overall_score = if sub_scores.is_empty() {
            None
        } else {
            let total: f64 = sub_scores.values().map(|s| s.value).sum();
            Some(total / sub_scores.len() as f64)
        };

        Self {
            symbol,
            overall_score,
            sub_scores,
        }
    }

    /// Returns true if at least one sub-score was available.
    #[must_use]
    pub const fn is_scored(&self) -> bool {
        self.overall_score.is_some()
    }

    /// Overall score rounded to one decimal place for display.
    #[must_use]
    pub fn display_score(&self) -> Option<f64> {
        self.overall_score.map(|s| (s * 10.0).round() / 10.0)
    }

    /// Value of one sub-score, if it was available.
    #[must_use]
    pub fn sub_score(&self, kind: SubScoreKind) -> Option<f64> {
        self.sub_scores.get(&kind).map(|s| s.value)
    }

    /// Sub-scores keyed by their breakdown field names (`"debt_score"`, ...).
    #[must_use]
    pub fn detailed_scores(&self) -> BTreeMap<&'static str, f64> {
        self.sub_scores
            .iter()
            .map(|(kind, score)| (kind.field_name(), score.value))
            .collect()
    }
}

impl fmt::Display for FinancialScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.display_score() {
            Some(score) => write!(f, "{score:.1}"),
            None => f.write_str("N/A"),
        }
    }
}
