#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/screener/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Stock scoring and screening.
//!
//! This crate provides a unified interface over the screener workspace. It
//! re-exports core types, scoring rules, caches and providers, and provides
//! the [`Screener`] batch orchestrator and the [`ProviderRegistry`] for
//! falling back across providers.
//!
//! # Features
//!
//! - `yahoo` - Yahoo Finance provider for live fundamentals
//! - `cache-sqlite` - SQLite-based snapshot caching

// Core types and traits
pub use screener_core::*;

// Scoring and screening rules
pub use screener_scoring::{
    Bound, Criterion, CriterionField, CriterionOutcome, FinancialScore, ScreeningCriteria,
    SubScore, SubScoreKind, Verdict,
};

// Cache implementations
#[cfg(feature = "cache-sqlite")]
pub use screener_cache::SqliteCache;
pub use screener_cache::{InMemoryCache, NoopCache};

// Providers
pub use screener_fixtures::FixtureProvider;
#[cfg(feature = "yahoo")]
pub use screener_yahoo::YahooProvider;

mod config;
pub use config::ScreenerConfig;

mod registry;
pub use registry::ProviderRegistry;

mod orchestrator;
pub use orchestrator::{Screener, ScreeningReport, ScreeningResult};
