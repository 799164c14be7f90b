//! `screener`: score and screen stocks from the command line.
//!
//! Usage:
//!   screener score AAPL
//!   screener info 7203.T
//!   screener financial MSFT
//!   screener history AAPL --period 3mo
//!   screener screen AAPL MSFT GOOGL --min-roe 0.10 --max-pe-ratio 30
//!   screener --offline screen 6758.T 9984.T 7203.T --ranked

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use screener::{HistoryPeriod, Screener, ScreenerConfig, ScreeningCriteria, Symbol};
use serde_json::json;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "screener", version, about = "Stock financial-health scoring and screening")]
struct Cli {
    /// Serve bundled sample data only, without network access
    #[arg(long, global = true)]
    offline: bool,

    /// SQLite file for the snapshot cache
    #[arg(long, global = true, value_name = "PATH")]
    cache_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Financial score of one symbol with its breakdown
    Score {
        /// Ticker, e.g. AAPL or 7203.T
        symbol: Symbol,
    },
    /// Company profile and raw metrics of one symbol
    Info {
        /// Ticker, e.g. AAPL or 7203.T
        symbol: Symbol,
    },
    /// Annual income statement, balance sheet and cash flow of one symbol
    Financial {
        /// Ticker, e.g. AAPL or 7203.T
        symbol: Symbol,
    },
    /// Daily price bars of one symbol
    History {
        /// Ticker, e.g. AAPL or 7203.T
        symbol: Symbol,

        /// Lookback: 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd or max
        #[arg(long, default_value = "1y")]
        period: HistoryPeriod,
    },
    /// Score and screen several symbols against thresholds
    Screen {
        /// Tickers to screen
        #[arg(required = true)]
        symbols: Vec<String>,

        #[command(flatten)]
        criteria: CriteriaArgs,

        /// Print results best score first instead of in request order
        #[arg(long)]
        ranked: bool,
    },
}

#[derive(Args, Debug, Default)]
struct CriteriaArgs {
    /// Minimum market capitalization
    #[arg(long)]
    min_market_cap: Option<f64>,
    /// Maximum P/E ratio
    #[arg(long)]
    max_pe_ratio: Option<f64>,
    /// Minimum return on equity, as a fraction (0.10 = 10%)
    #[arg(long)]
    min_roe: Option<f64>,
    /// Maximum debt-to-equity multiple (1.0 = 100%)
    #[arg(long)]
    max_debt_to_equity: Option<f64>,
    /// Minimum current ratio
    #[arg(long)]
    min_current_ratio: Option<f64>,
}

impl From<CriteriaArgs> for ScreeningCriteria {
    fn from(args: CriteriaArgs) -> Self {
        Self {
            min_market_cap: args.min_market_cap,
            max_pe_ratio: args.max_pe_ratio,
            min_roe: args.min_roe,
            max_debt_to_equity: args.max_debt_to_equity,
            min_current_ratio: args.min_current_ratio,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "screener=info,screener_yahoo=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = ScreenerConfig::from_env().context("reading SCREENER_* settings")?;
    if cli.offline {
        config = config.with_offline(true);
    }
    if let Some(path) = cli.cache_path {
        config = config.with_cache_path(path);
    }
    debug!(?config, "Loaded configuration");

    let screener = Screener::from_config(config).context("building screener")?;

    let output = match cli.command {
        Command::Score { symbol } => {
            let score = screener
                .score(&symbol)
                .await
                .with_context(|| format!("scoring {symbol}"))?;
            json!({
                "symbol": score.symbol,
                "overallScore": score.overall_score,
                "displayScore": score.to_string(),
                "detailedScores": score.detailed_scores(),
            })
        }
        Command::Info { symbol } => {
            let snapshot = screener
                .snapshot(&symbol)
                .await
                .with_context(|| format!("fetching {symbol}"))?;
            serde_json::to_value(&snapshot)?
        }
        Command::Financial { symbol } => {
            let statements = screener
                .financials(&symbol)
                .await
                .with_context(|| format!("fetching statements of {symbol}"))?;
            serde_json::to_value(&statements)?
        }
        Command::History { symbol, period } => {
            let history = screener
                .history(&symbol, period)
                .await
                .with_context(|| format!("fetching {period} history of {symbol}"))?;
            let mut value = serde_json::to_value(&history)?;
            value["totalReturn"] = json!(history.total_return());
            value
        }
        Command::Screen {
            symbols,
            criteria,
            ranked,
        } => {
            let report = screener
                .screen(&symbols, &criteria.into())
                .await
                .context("screening")?;
            if ranked {
                let mut value = serde_json::to_value(&report)?;
                value["results"] = serde_json::to_value(report.ranked())?;
                value
            } else {
                serde_json::to_value(&report)?
            }
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_screen() {
        let cli = Cli::try_parse_from([
            "screener",
            "--offline",
            "screen",
            "aapl",
            "MSFT",
            "--min-roe",
            "0.1",
            "--max-pe-ratio",
            "30",
        ])
        .unwrap();

        assert!(cli.offline);
        let Command::Screen {
            symbols,
            criteria,
            ranked,
        } = cli.command
        else {
            panic!("expected screen command");
        };
        assert_eq!(symbols, vec!["aapl", "MSFT"]);
        assert!(!ranked);

        let criteria = ScreeningCriteria::from(criteria);
        assert_eq!(criteria.min_roe, Some(0.1));
        assert_eq!(criteria.max_pe_ratio, Some(30.0));
        assert_eq!(criteria.min_market_cap, None);
    }

    #[test]
    fn test_parse_score_normalizes_symbol() {
        let cli = Cli::try_parse_from(["screener", "score", "7203.t"]).unwrap();

        let Command::Score { symbol } = cli.command else {
            panic!("expected score command");
        };
        assert_eq!(symbol.as_str(), "7203.T");
    }

    #[test]
    fn test_screen_requires_symbols() {
        assert!(Cli::try_parse_from(["screener", "screen"]).is_err());
        assert!(Cli::try_parse_from(["screener", "score", ""]).is_err());
    }

    #[test]
    fn test_parse_history_period() {
        let cli = Cli::try_parse_from(["screener", "history", "aapl", "--period", "3mo"]).unwrap();

        let Command::History { symbol, period } = cli.command else {
            panic!("expected history command");
        };
        assert_eq!(symbol.as_str(), "AAPL");
        assert_eq!(period, HistoryPeriod::ThreeMonths);

        let cli = Cli::try_parse_from(["screener", "history", "MSFT"]).unwrap();
        let Command::History { period, .. } = cli.command else {
            panic!("expected history command");
        };
        assert_eq!(period, HistoryPeriod::OneYear);
    }

    #[test]
    fn test_history_rejects_unknown_period() {
        assert!(Cli::try_parse_from(["screener", "history", "AAPL", "--period", "3y"]).is_err());
        assert!(Cli::try_parse_from(["screener", "history", "AAPL", "--period", ""]).is_err());
    }

    #[test]
    fn test_parse_financial() {
        let cli = Cli::try_parse_from(["screener", "--offline", "financial", "6758.t"]).unwrap();

        assert!(cli.offline);
        let Command::Financial { symbol } = cli.command else {
            panic!("expected financial command");
        };
        assert_eq!(symbol.as_str(), "6758.T");
    }
}
