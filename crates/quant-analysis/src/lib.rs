//! Return/risk metrics, benchmark comparison and rule-based recommendations
//! over an OHLCV series.
//!
//! Every function here is synchronous and pure. Callers fetch the bars and
//! hand in immutable slices; nothing is cached between calls.

pub mod benchmark;
pub mod metrics;
pub mod recommendation;
pub mod report;
pub mod returns;


pub use benchmark::{compute_benchmark_metrics, BenchmarkInterpretation, BenchmarkMetrics};
pub use metrics::{
    compute_metrics, conditional_var, cvar, max_drawdown, sharpe_ratio, sortino_ratio,
    value_at_risk, DrawdownAnalysis, MetricsBundle, ReturnsMetrics, VarEstimate,
};
pub use recommendation::{
    synthesize_recommendation, Confidence, Recommendation, RecommendationLabel, DISCLAIMER,
};
pub use report::{AnalysisPeriod, MetricsGlossary, QuantReport, RiskMetrics};
pub use returns::ReturnSeries;

use analysis_core::{AnalysisError, Bar};

/// Default annual risk-free rate (2%).
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;

/// Entry point bundling the engine operations behind one risk-free rate.
#[derive(Debug, Clone, Copy)]
pub struct QuantAnalysisEngine {
    risk_free_rate: f64,
}

impl QuantAnalysisEngine {
    pub fn new() -> Self {
        Self {
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
        }
    }

    pub fn with_risk_free_rate(risk_free_rate: f64) -> Self {
        Self { risk_free_rate }
    }

    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    pub fn compute_metrics(&self, bars: &[Bar]) -> Result<MetricsBundle, AnalysisError> {
        compute_metrics(bars, self.risk_free_rate)
    }

    pub fn benchmark(
        &self,
        bars: &[Bar],
        benchmark: &[Bar],
    ) -> Result<BenchmarkMetrics, AnalysisError> {
        compute_benchmark_metrics(bars, benchmark)
    }

    pub fn recommend(
        &self,
        metrics: &MetricsBundle,
        benchmark: Option<&BenchmarkMetrics>,
    ) -> Recommendation {
        synthesize_recommendation(metrics, benchmark, self.risk_free_rate)
    }

    /// Comprehensive report; see [`QuantReport::build`].
    pub fn analyze(
        &self,
        symbol: &str,
        bars: &[Bar],
        benchmark: Option<&[Bar]>,
    ) -> Result<QuantReport, AnalysisError> {
        QuantReport::build(symbol, bars, benchmark, self.risk_free_rate)
    }
}

impl Default for QuantAnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}
