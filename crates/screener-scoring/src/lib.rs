#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/screener/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Financial health scoring and threshold screening.
//!
//! Everything in this crate is a pure function of [`StockMetrics`](screener_core::StockMetrics):
//! the same metrics always produce the same scores and the same verdict.

/// Overall score aggregation.
pub mod aggregate;
/// Threshold screening.
pub mod filter;
/// Per-metric sub-score calculators.
pub mod subscore;

pub use aggregate::FinancialScore;
pub use filter::{Bound, Criterion, CriterionField, CriterionOutcome, ScreeningCriteria, Verdict};
pub use subscore::{
    MAX_SCORE, MIN_SCORE, SubScore, SubScoreKind, debt_score, liquidity_score, pe_score,
    profit_score, roe_score,
};
