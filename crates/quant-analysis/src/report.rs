use std::collections::BTreeMap;

use analysis_core::{AnalysisError, Bar};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::benchmark::{compute_benchmark_metrics, BenchmarkMetrics};
use crate::metrics::{compute_metrics, DrawdownAnalysis, MetricsBundle, ReturnsMetrics, VarEstimate};
use crate::recommendation::{synthesize_recommendation, Recommendation};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisPeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub trading_days: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    /// Present only when the benchmark comparison succeeded.
    pub information_ratio: Option<f64>,
    pub var_95: VarEstimate,
    pub var_99: VarEstimate,
    pub cvar_95: f64,
    pub max_drawdown: DrawdownAnalysis,
}

/// Reference text explaining each reported metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsGlossary {
    pub returns: BTreeMap<String, String>,
    pub risk_metrics: BTreeMap<String, String>,
    pub interpretation_guide: BTreeMap<String, String>,
}

fn section(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl MetricsGlossary {
    pub fn standard() -> Self {
        Self {
            returns: section(&[
                ("total_return_pct", "Price change from the first to the last close of the period"),
                ("annualized_return_pct", "Mean daily return scaled to 252 trading days"),
                ("annualized_volatility_pct", "Standard deviation of daily returns scaled by the square root of 252"),
                ("cumulative_return_pct", "Compounded growth of all daily returns"),
                ("max_return_pct", "Best single-day return in the period"),
                ("min_return_pct", "Worst single-day return in the period"),
            ]),
            risk_metrics: section(&[
                ("sharpe_ratio", "Excess annual return over the risk-free rate per unit of volatility"),
                ("sortino_ratio", "Like Sharpe, but only downside volatility counts as risk"),
                ("information_ratio", "Annualized mean of returns over the benchmark per unit of tracking error"),
                ("beta", "Sensitivity of the security's returns to the benchmark's returns"),
                ("alpha", "Annualized return not explained by the benchmark exposure"),
                ("var", "Daily loss that should not be exceeded at the given confidence level"),
                ("cvar", "Average loss on the days that breach the VaR threshold"),
                ("max_drawdown", "Largest peak-to-trough decline in closing price"),
            ]),
            interpretation_guide: section(&[
                ("sharpe_ratio", "Above 1 is good, above 2 is very good, below 0 loses to cash"),
                ("sortino_ratio", "Above 2 is good; higher means fewer large losses"),
                ("beta", "1.0 moves with the market, above 1 amplifies it, below 1 dampens it"),
                ("alpha", "Positive means outperforming the benchmark after adjusting for beta"),
                ("var", "A 95% VaR of -2% means about 1 day in 20 loses more than 2%"),
                ("max_drawdown", "Beyond -20% is significant, beyond -30% is severe"),
            ]),
        }
    }
}

/// Full quantitative report for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantReport {
    pub symbol: String,
    pub analysis_period: AnalysisPeriod,
    pub returns: ReturnsMetrics,
    pub risk_metrics: RiskMetrics,
    pub market_metrics: Option<BenchmarkMetrics>,
    /// Why `market_metrics` is missing, when a benchmark was supplied but unusable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark_note: Option<String>,
    pub recommendation: Recommendation,
    pub metrics_glossary: MetricsGlossary,
}

impl QuantReport {
    /// Build a report. Benchmark failures degrade the report instead of failing it.
    pub fn build(
        symbol: &str,
        bars: &[Bar],
        benchmark: Option<&[Bar]>,
        risk_free_rate: f64,
    ) -> Result<Self, AnalysisError> {
        let metrics = compute_metrics(bars, risk_free_rate)?;

        let (market_metrics, benchmark_note) = match benchmark {
            Some(bench) => match compute_benchmark_metrics(bars, bench) {
                Ok(m) => (Some(m), None),
                Err(e) => (None, Some(e.to_string())),
            },
            None => (None, None),
        };

        Ok(Self::from_parts(symbol, bars, metrics, market_metrics, benchmark_note))
    }

    pub fn from_parts(
        symbol: &str,
        bars: &[Bar],
        metrics: MetricsBundle,
        market_metrics: Option<BenchmarkMetrics>,
        benchmark_note: Option<String>,
    ) -> Self {
        let recommendation =
            synthesize_recommendation(&metrics, market_metrics.as_ref(), metrics.risk_free_rate);

        let analysis_period = AnalysisPeriod {
            start_date: bars.first().map(|b| b.date()).unwrap_or(metrics.drawdown.peak_date),
            end_date: bars.last().map(|b| b.date()).unwrap_or(metrics.drawdown.trough_date),
            trading_days: bars.len(),
        };

        let MetricsBundle {
            returns,
            sharpe_ratio,
            sortino_ratio,
            var_95,
            var_99,
            cvar_95,
            drawdown,
            ..
        } = metrics;

        QuantReport {
            symbol: symbol.to_uppercase(),
            analysis_period,
            returns,
            risk_metrics: RiskMetrics {
                sharpe_ratio,
                sortino_ratio,
                information_ratio: market_metrics.as_ref().map(|m| m.information_ratio),
                var_95,
                var_99,
                cvar_95,
                max_drawdown: drawdown,
            },
            market_metrics,
            benchmark_note,
            recommendation,
            metrics_glossary: MetricsGlossary::standard(),
        }
    }
}
