use std::path::PathBuf;

use analysis_core::Period;
use serde::{Deserialize, Serialize};

/// Symbols scanned when the caller does not name any.
pub const DEFAULT_SCAN_SYMBOLS: &[&str] = &[
    "AAPL", "MSFT", "GOOGL", "AMZN", "META", "NVDA", "TSLA", "AMD", "INTC", "CRM", // tech
    "JPM", "BAC", "GS", "MS", "WFC", "C", "V", "MA", // finance
    "JNJ", "UNH", "PFE", "ABBV", "MRK", "LLY", "TMO", // healthcare
    "WMT", "HD", "DIS", "NKE", "COST", "MCD", "SBUX", "PG", // consumer
    "XOM", "CVX", "COP", "SLB", // energy
    "BA", "CAT", "GE", "UPS", // industrial
    "T", "VZ", "NFLX", // communication
    "TSM", "AVGO", "QCOM", "MU", // semiconductors
];

/// Runtime settings for the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub risk_free_rate: f64,
    pub benchmark_symbol: String,
    pub analysis_period: Period,
    /// History fetched for forecasts.
    pub forecast_history_period: Period,
    pub scan_symbols: Vec<String>,
    pub market_data_dir: PathBuf,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.02,
            benchmark_symbol: "SPY".to_string(),
            analysis_period: Period::Year1,
            forecast_history_period: Period::Month3,
            scan_symbols: DEFAULT_SCAN_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            market_data_dir: PathBuf::from("./data"),
        }
    }
}

impl AnalysisConfig {
    /// Read settings from the process environment. Missing or unparsable
    /// values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let risk_free_rate = lookup("RISK_FREE_RATE")
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|r| r.is_finite())
            .unwrap_or(defaults.risk_free_rate);

        let benchmark_symbol = lookup("BENCHMARK_SYMBOL")
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.benchmark_symbol);

        let analysis_period = lookup("ANALYSIS_PERIOD")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.analysis_period);

        let forecast_history_period = lookup("FORECAST_HISTORY_PERIOD")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.forecast_history_period);

        let scan_symbols = lookup("SCAN_SYMBOLS")
            .map(|s| parse_symbol_list(&s))
            .filter(|list| !list.is_empty())
            .unwrap_or(defaults.scan_symbols);

        let market_data_dir = lookup("MARKET_DATA_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.market_data_dir);

        Self {
            risk_free_rate,
            benchmark_symbol,
            analysis_period,
            forecast_history_period,
            scan_symbols,
            market_data_dir,
        }
    }
}

/// Split a comma-separated symbol list, upper-casing and dropping blanks.
pub fn parse_symbol_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}
