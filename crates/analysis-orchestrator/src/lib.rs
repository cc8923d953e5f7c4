use std::sync::Arc;

use analysis_core::{
    AnalysisError, AnalystAction, Bar, EarningsCalendar, FinancialStatement, Interval,
    MarketDataSource, Period, Quote, StatementKind,
};
use chrono::{DateTime, Duration, Utc};
use futures_util::future::join_all;
use price_forecast::{predict, Prediction, PredictionMethod};
use quant_analysis::{BenchmarkMetrics, QuantAnalysisEngine, QuantReport};
use serde::{Deserialize, Serialize};

pub mod config;
pub mod data_source;
pub mod screener;

#[cfg(test)]
mod tests;

pub use config::{parse_symbol_list, AnalysisConfig, DEFAULT_SCAN_SYMBOLS};
pub use data_source::{trim_to_period, InMemorySource, JsonFileSource, SymbolData};
pub use screener::{ScanEntry, ScanResult, SkippedSymbol};

/// Longest forecast horizon accepted from callers.
pub const MAX_FORECAST_DAYS: usize = 30;

/// Widest window for market-wide analyst changes.
pub const MAX_ANALYST_DAYS_BACK: i64 = 30;

/// Most analyst actions returned for a single symbol.
pub const MAX_ANALYST_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    pub symbol: String,
    pub method: PredictionMethod,
    pub horizon_days: usize,
    pub history_bars: usize,
    pub prediction: Prediction,
}

/// Headline metrics for one side of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolSummary {
    pub symbol: String,
    pub trading_days: usize,
    pub start_price: f64,
    pub end_price: f64,
    pub total_return_pct: f64,
    pub annualized_volatility_pct: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub period: Period,
    pub first: SymbolSummary,
    pub second: SymbolSummary,
    /// The first symbol measured against the second.
    pub relative: Option<BenchmarkMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_note: Option<String>,
}

/// One analyst action tagged with its symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalystChange {
    pub symbol: String,
    #[serde(flatten)]
    pub action: AnalystAction,
}

/// Recent analyst actions for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalystRatings {
    pub symbol: String,
    pub recent_changes: Vec<AnalystAction>,
}

/// Raw bars for one symbol over a lookback window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalData {
    pub symbol: String,
    pub period: Period,
    pub interval: Interval,
    pub bars: Vec<Bar>,
}

/// Glue between a market data source and the analytics engines.
///
/// Holds no mutable state; every call fetches fresh data and builds its
/// result from scratch, so one instance can be shared across tasks.
pub struct AnalysisOrchestrator {
    source: Arc<dyn MarketDataSource>,
    config: AnalysisConfig,
    quant_engine: QuantAnalysisEngine,
}

impl AnalysisOrchestrator {
    pub fn new(source: Arc<dyn MarketDataSource>, config: AnalysisConfig) -> Self {
        let quant_engine = QuantAnalysisEngine::with_risk_free_rate(config.risk_free_rate);
        Self {
            source,
            config,
            quant_engine,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn quant_engine(&self) -> &QuantAnalysisEngine {
        &self.quant_engine
    }

    async fn daily_history(&self, symbol: &str, period: Period) -> Result<Vec<Bar>, AnalysisError> {
        self.source.fetch_history(symbol, period, Interval::Day1).await
    }

    pub async fn quote(&self, symbol: &str) -> Result<Quote, AnalysisError> {
        let symbol = symbol.to_uppercase();
        tracing::info!("Fetching quote for {}", symbol);
        self.source.fetch_quote(&symbol).await
    }

    /// Comprehensive quant report. `benchmark` defaults to the configured
    /// benchmark symbol; an empty string skips the comparison. A benchmark
    /// that cannot be fetched or aligned is reported in `benchmark_note`
    /// instead of failing the request.
    pub async fn quant_analysis(
        &self,
        symbol: &str,
        benchmark: Option<&str>,
        period: Option<Period>,
    ) -> Result<QuantReport, AnalysisError> {
        let symbol = symbol.to_uppercase();
        let period = period.unwrap_or(self.config.analysis_period);
        let benchmark = benchmark
            .unwrap_or(&self.config.benchmark_symbol)
            .trim()
            .to_uppercase();

        tracing::info!(
            "Starting quant analysis for {} (benchmark: {}, period: {})",
            symbol,
            if benchmark.is_empty() { "none" } else { benchmark.as_str() },
            period
        );

        if benchmark.is_empty() {
            let bars = self.daily_history(&symbol, period).await?;
            return self.quant_engine.analyze(&symbol, &bars, None);
        }

        let (bars, benchmark_bars) = tokio::join!(
            self.daily_history(&symbol, period),
            self.daily_history(&benchmark, period),
        );
        let bars = bars?;

        match benchmark_bars {
            Ok(benchmark_bars) => {
                let report = self.quant_engine.analyze(&symbol, &bars, Some(&benchmark_bars))?;
                if let Some(note) = &report.benchmark_note {
                    tracing::warn!("Benchmark {} skipped for {}: {}", benchmark, symbol, note);
                }
                Ok(report)
            }
            Err(e) => {
                tracing::warn!("Benchmark {} unavailable for {}: {}", benchmark, symbol, e);
                let mut report = self.quant_engine.analyze(&symbol, &bars, None)?;
                report.benchmark_note = Some(e.to_string());
                Ok(report)
            }
        }
    }

    /// Price forecast by method over the configured forecast history.
    pub async fn predict(
        &self,
        symbol: &str,
        horizon_days: usize,
        method: PredictionMethod,
    ) -> Result<PredictionReport, AnalysisError> {
        if horizon_days == 0 || horizon_days > MAX_FORECAST_DAYS {
            return Err(AnalysisError::InvalidData(format!(
                "days must be between 1 and {}, got {}",
                MAX_FORECAST_DAYS, horizon_days
            )));
        }

        let symbol = symbol.to_uppercase();
        tracing::info!("Predicting {} for {} days using {}", symbol, horizon_days, method);

        let bars = self
            .daily_history(&symbol, self.config.forecast_history_period)
            .await?;
        let prediction = predict(&bars, method, horizon_days)?;

        if let Prediction::Ensemble(forecast) = &prediction {
            tracing::debug!("Ensemble for {} used {:?}", symbol, forecast.methods_used);
        }

        Ok(PredictionReport {
            symbol,
            method,
            horizon_days,
            history_bars: bars.len(),
            prediction,
        })
    }

    /// Headline metrics for two symbols plus the first measured against the second.
    pub async fn compare(
        &self,
        symbol1: &str,
        symbol2: &str,
        period: Option<Period>,
    ) -> Result<Comparison, AnalysisError> {
        let (symbol1, symbol2) = (symbol1.to_uppercase(), symbol2.to_uppercase());
        let period = period.unwrap_or(self.config.analysis_period);
        tracing::info!("Comparing {} with {} over {}", symbol1, symbol2, period);

        let (bars1, bars2) = tokio::join!(
            self.daily_history(&symbol1, period),
            self.daily_history(&symbol2, period),
        );
        let (bars1, bars2) = (bars1?, bars2?);

        let first = self.summarize(&symbol1, &bars1)?;
        let second = self.summarize(&symbol2, &bars2)?;

        let (relative, relative_note) = match self.quant_engine.benchmark(&bars1, &bars2) {
            Ok(m) => (Some(m), None),
            Err(e) => {
                tracing::warn!("No relative metrics for {} vs {}: {}", symbol1, symbol2, e);
                (None, Some(e.to_string()))
            }
        };

        Ok(Comparison {
            period,
            first,
            second,
            relative,
            relative_note,
        })
    }

    fn summarize(&self, symbol: &str, bars: &[Bar]) -> Result<SymbolSummary, AnalysisError> {
        let metrics = self.quant_engine.compute_metrics(bars)?;
        Ok(SymbolSummary {
            symbol: symbol.to_string(),
            trading_days: bars.len(),
            start_price: bars[0].close,
            end_price: bars[bars.len() - 1].close,
            total_return_pct: metrics.total_return_pct(),
            annualized_volatility_pct: metrics.annualized_volatility_pct(),
            sharpe_ratio: metrics.sharpe_ratio,
            max_drawdown_pct: metrics.max_drawdown_pct(),
        })
    }

    /// Bars for `symbol` over `period` at `interval`, oldest first.
    pub async fn history(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<HistoricalData, AnalysisError> {
        let symbol = symbol.to_uppercase();
        tracing::info!("Fetching {} history for {} ({} bars)", period, symbol, interval);
        let bars = self.source.fetch_history(&symbol, period, interval).await?;
        if bars.is_empty() {
            return Err(AnalysisError::UpstreamUnavailable(format!(
                "No historical data found for {}",
                symbol
            )));
        }
        Ok(HistoricalData {
            symbol,
            period,
            interval,
            bars,
        })
    }

    /// The `limit` most recent analyst actions for `symbol`, newest first.
    /// `limit` is clamped to `1..=MAX_ANALYST_LIMIT`.
    pub async fn analyst_ratings(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<AnalystRatings, AnalysisError> {
        let symbol = symbol.to_uppercase();
        let mut recent_changes = self.source.fetch_analyst_actions(&symbol).await?;
        recent_changes.sort_by(|a, b| b.date.cmp(&a.date));
        recent_changes.truncate(limit.clamp(1, MAX_ANALYST_LIMIT));
        tracing::debug!("{} analyst actions for {}", recent_changes.len(), symbol);
        Ok(AnalystRatings {
            symbol,
            recent_changes,
        })
    }

    /// Analyst actions dated on or after `now - days_back` across `symbols`
    /// (the configured scan list when `None`), most recent first. Symbols
    /// whose fetch fails are skipped. `days_back` is clamped to
    /// `1..=MAX_ANALYST_DAYS_BACK`.
    pub async fn market_analyst_changes(
        &self,
        symbols: Option<&[String]>,
        days_back: i64,
        now: DateTime<Utc>,
    ) -> Vec<AnalystChange> {
        let symbols: Vec<String> = symbols
            .unwrap_or(&self.config.scan_symbols)
            .iter()
            .map(|s| s.to_uppercase())
            .collect();
        let cutoff = now - Duration::days(days_back.clamp(1, MAX_ANALYST_DAYS_BACK));

        tracing::info!(
            "Scanning {} symbols for analyst changes since {}",
            symbols.len(),
            cutoff.format("%Y-%m-%d %H:%M")
        );

        let fetched = join_all(symbols.iter().map(|symbol| async move {
            (symbol.clone(), self.source.fetch_analyst_actions(symbol).await)
        }))
        .await;

        let mut changes: Vec<AnalystChange> = Vec::new();
        for (symbol, result) in fetched {
            match result {
                Ok(actions) => changes.extend(
                    actions
                        .into_iter()
                        .filter(|a| a.date >= cutoff)
                        .map(|action| AnalystChange {
                            symbol: symbol.clone(),
                            action,
                        }),
                ),
                Err(e) => tracing::debug!("Skipping analyst actions for {}: {}", symbol, e),
            }
        }

        changes.sort_by(|a, b| {
            b.action
                .date
                .cmp(&a.action.date)
                .then_with(|| a.symbol.cmp(&b.symbol))
        });
        changes
    }

    pub async fn financial_statement(
        &self,
        symbol: &str,
        kind: StatementKind,
        quarterly: bool,
    ) -> Result<FinancialStatement, AnalysisError> {
        let symbol = symbol.to_uppercase();
        tracing::info!(
            "Fetching {} statement for {} (quarterly: {})",
            kind.as_str(),
            symbol,
            quarterly
        );
        self.source
            .fetch_financial_statements(&symbol, kind, quarterly)
            .await
    }

    pub async fn next_earnings(
        &self,
        symbol: &str,
    ) -> Result<Option<EarningsCalendar>, AnalysisError> {
        let symbol = symbol.to_uppercase();
        self.source.fetch_calendar(&symbol).await
    }
}
