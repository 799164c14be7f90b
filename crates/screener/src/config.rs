//! Screener configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use screener_core::{Result, ScreenerError};

const DEFAULT_MAX_SYMBOLS_PER_REQUEST: usize = 10;
const DEFAULT_MAX_CONCURRENCY: usize = 4;
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);
const DEFAULT_YAHOO_RATE_LIMIT: Duration = Duration::from_millis(200);

/// Tunables for [`Screener`](crate::Screener).
///
/// | Field | Variable | Default |
/// |---|---|---|
/// | `max_symbols_per_request` | `SCREENER_MAX_SYMBOLS` | 10 |
/// | `max_concurrency` | `SCREENER_MAX_CONCURRENCY` | 4 |
/// | `cache_ttl` | `SCREENER_CACHE_TTL_SECS` | 3600 |
/// | `yahoo_rate_limit` | `SCREENER_YAHOO_RATE_LIMIT_MS` | 200 |
/// | `cache_path` | `SCREENER_CACHE_PATH` | unset (in-memory cache) |
/// | `offline` | `SCREENER_OFFLINE` | false |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenerConfig {
    /// Largest accepted batch.
    pub max_symbols_per_request: usize,
    /// Symbols fetched at the same time.
    pub max_concurrency: usize,
    /// Age after which cached snapshots are refetched.
    pub cache_ttl: Duration,
    /// Minimum spacing between Yahoo Finance requests.
    pub yahoo_rate_limit: Duration,
    /// SQLite cache file. `None` keeps snapshots in memory.
    pub cache_path: Option<PathBuf>,
    /// Serve sample data only, without network access.
    pub offline: bool,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            max_symbols_per_request: DEFAULT_MAX_SYMBOLS_PER_REQUEST,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            cache_ttl: DEFAULT_CACHE_TTL,
            yahoo_rate_limit: DEFAULT_YAHOO_RATE_LIMIT,
            cache_path: None,
            offline: false,
        }
    }
}

impl ScreenerConfig {
    /// Reads the configuration from `SCREENER_*` environment variables.
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    /// Returns [`ScreenerError::Config`] if a variable is set but malformed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps variable names to values.
    ///
    /// # Errors
    /// Returns [`ScreenerError::Config`] if a value is malformed or out of range.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            max_symbols_per_request: parse_var(&lookup, "SCREENER_MAX_SYMBOLS")?
                .unwrap_or(defaults.max_symbols_per_request),
            max_concurrency: parse_var(&lookup, "SCREENER_MAX_CONCURRENCY")?
                .unwrap_or(defaults.max_concurrency),
            cache_ttl: parse_var(&lookup, "SCREENER_CACHE_TTL_SECS")?
                .map_or(defaults.cache_ttl, Duration::from_secs),
            yahoo_rate_limit: parse_var(&lookup, "SCREENER_YAHOO_RATE_LIMIT_MS")?
                .map_or(defaults.yahoo_rate_limit, Duration::from_millis),
            cache_path: lookup("SCREENER_CACHE_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            offline: match lookup("SCREENER_OFFLINE") {
                Some(value) => parse_flag("SCREENER_OFFLINE", &value)?,
                None => defaults.offline,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks that the limits are usable.
    ///
    /// # Errors
    /// Returns [`ScreenerError::Config`] if a limit is zero.
    pub fn validate(&self) -> Result<()> {
        if self.max_symbols_per_request == 0 {
            return Err(ScreenerError::Config(
                "max_symbols_per_request must be at least 1".to_string(),
            ));
        }
        if self.max_concurrency == 0 {
            return Err(ScreenerError::Config(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Sets the largest accepted batch.
    #[must_use]
    pub const fn with_max_symbols_per_request(mut self, max: usize) -> Self {
        self.max_symbols_per_request = max;
        self
    }

    /// Sets the number of symbols fetched at the same time.
    #[must_use]
    pub const fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max;
        self
    }

    /// Sets the cache TTL.
    #[must_use]
    pub const fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Sets the spacing between Yahoo Finance requests.
    #[must_use]
    pub const fn with_yahoo_rate_limit(mut self, rate_limit: Duration) -> Self {
        self.yahoo_rate_limit = rate_limit;
        self
    }

    /// Persists snapshots in a SQLite file.
    #[must_use]
    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    /// Restricts the screener to sample data.
    #[must_use]
    pub const fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|e| ScreenerError::Config(format!("{key}={value:?}: {e}")))
        })
        .transpose()
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ScreenerError::Config(format!(
            "{key}={value:?}: expected a boolean"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ScreenerConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config, ScreenerConfig::default());
        assert_eq!(config.max_symbols_per_request, 10);
        assert_eq!(config.max_concurrency, 4);
        assert_eq!(config.cache_ttl, Duration::from_secs(3600));
        assert_eq!(config.yahoo_rate_limit, Duration::from_millis(200));
        assert!(config.cache_path.is_none());
        assert!(!config.offline);
    }

    #[test]
    fn test_overrides() {
        let config = ScreenerConfig::from_lookup(lookup(&[
            ("SCREENER_MAX_SYMBOLS", "25"),
            ("SCREENER_MAX_CONCURRENCY", " 8 "),
            ("SCREENER_CACHE_TTL_SECS", "60"),
            ("SCREENER_YAHOO_RATE_LIMIT_MS", "1000"),
            ("SCREENER_CACHE_PATH", "/tmp/screener.db"),
            ("SCREENER_OFFLINE", "true"),
        ]))
        .unwrap();

        assert_eq!(config.max_symbols_per_request, 25);
        assert_eq!(config.max_concurrency, 8);
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.yahoo_rate_limit, Duration::from_secs(1));
        assert_eq!(config.cache_path, Some(PathBuf::from("/tmp/screener.db")));
        assert!(config.offline);
    }

    #[test]
    fn test_malformed_values() {
        let err = ScreenerConfig::from_lookup(lookup(&[("SCREENER_MAX_SYMBOLS", "ten")]));
        assert!(matches!(err, Err(ScreenerError::Config(_))));

        let err = ScreenerConfig::from_lookup(lookup(&[("SCREENER_OFFLINE", "maybe")]));
        assert!(matches!(err, Err(ScreenerError::Config(_))));

        let err = ScreenerConfig::from_lookup(lookup(&[("SCREENER_MAX_CONCURRENCY", "0")]));
        assert!(matches!(err, Err(ScreenerError::Config(_))));
    }

    #[test]
    fn test_builders() {
        let config = ScreenerConfig::default()
            .with_max_symbols_per_request(3)
            .with_max_concurrency(1)
            .with_offline(true)
            .with_cache_path("cache.db");

        assert_eq!(config.max_symbols_per_request, 3);
        assert_eq!(config.max_concurrency, 1);
        assert!(config.offline);
        assert!(config.validate().is_ok());
    }
}
