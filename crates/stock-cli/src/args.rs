use std::path::PathBuf;
use std::str::FromStr;

use analysis_core::{AnalysisError, Interval, Period, StatementKind};
use analysis_orchestrator::{MAX_ANALYST_DAYS_BACK, MAX_ANALYST_LIMIT};
use clap::{Parser, Subcommand};
use price_forecast::PredictionMethod;

#[derive(Debug, Parser)]
#[command(name = "stock-cli")]
#[command(about = "Quotes, quant reports, forecasts and scans over local market data")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Print the result as JSON instead of a table
    #[arg(long, global = true)]
    pub json: bool,

    /// Directory of <SYMBOL>.json market data files (default: $MARKET_DATA_DIR or ./data)
    #[arg(long, global = true, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,
}

/// Which fundamentals to show for `financials`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FinancialsReport {
    Statement(StatementKind),
    NextEarnings,
}

impl FromStr for FinancialsReport {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "earnings" | "next-earnings" => Ok(Self::NextEarnings),
            other => other.parse().map(Self::Statement),
        }
    }
}

#[derive(Debug, PartialEq, Subcommand)]
pub enum Command {
    /// Latest quote
    Quote {
        #[arg(value_parser = symbol)]
        symbol: String,
    },
    /// Risk/return metrics, benchmark comparison and recommendation
    Quant {
        #[arg(value_parser = symbol)]
        symbol: String,
        /// Benchmark symbol; pass '' to skip the comparison
        #[arg(long, short)]
        benchmark: Option<String>,
        #[arg(long, short)]
        period: Option<Period>,
    },
    /// Price forecast
    Predict {
        #[arg(value_parser = symbol)]
        symbol: String,
        #[arg(long, short, default_value_t = 7)]
        days: usize,
        /// linear, ma, advanced or ensemble
        #[arg(long, short, default_value = "ensemble")]
        method: PredictionMethod,
    },
    /// Headline metrics for two symbols side by side
    Compare {
        #[arg(value_parser = symbol)]
        first: String,
        #[arg(value_parser = symbol)]
        second: String,
        #[arg(long, short)]
        period: Option<Period>,
    },
    /// Score a list of symbols
    Scan {
        /// Comma-separated symbols (default: the configured scan list)
        #[arg(long, value_delimiter = ',', value_parser = symbol)]
        symbols: Option<Vec<String>>,
        #[arg(long, short)]
        period: Option<Period>,
    },
    /// Recent analyst actions for one symbol, or market-wide without one (or with `market`)
    Analyst {
        #[arg(value_parser = symbol)]
        symbol: Option<String>,
        /// Actions to show for a single symbol
        #[arg(
            long,
            short,
            default_value_t = 20,
            value_parser = clap::value_parser!(u64).range(1..=MAX_ANALYST_LIMIT as u64)
        )]
        limit: u64,
        /// Days to look back for market-wide changes
        #[arg(
            long,
            short,
            default_value_t = 1,
            value_parser = clap::value_parser!(i64).range(1..=MAX_ANALYST_DAYS_BACK)
        )]
        days_back: i64,
        /// Comma-separated symbols for market-wide changes
        #[arg(long, value_delimiter = ',', value_parser = symbol)]
        symbols: Option<Vec<String>>,
    },
    /// Raw price bars
    History {
        #[arg(value_parser = symbol)]
        symbol: String,
        #[arg(long, short, default_value = "1mo")]
        period: Period,
        #[arg(long, short, default_value = "1d")]
        interval: Interval,
    },
    /// Financial statements or the next earnings date
    Financials {
        #[arg(value_parser = symbol)]
        symbol: String,
        /// income, balance, cashflow or earnings
        #[arg(default_value = "income")]
        report: FinancialsReport,
        #[arg(long, short)]
        quarterly: bool,
    },
}

fn symbol(raw: &str) -> Result<String, String> {
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty() {
        return Err("symbol must not be empty".to_string());
    }
    Ok(symbol)
}
