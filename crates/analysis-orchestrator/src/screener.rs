use std::collections::HashSet;

use super::AnalysisOrchestrator;
use analysis_core::{AnalysisError, Bar, Period};
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use quant_analysis::{Confidence, QuantAnalysisEngine, RecommendationLabel};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanEntry {
    pub symbol: String,
    pub score: i32,
    pub recommendation: RecommendationLabel,
    pub confidence: Confidence,
    pub current_price: f64,
    pub total_return_pct: f64,
    pub annualized_volatility_pct: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub period: Period,
    pub entries: Vec<ScanEntry>,
    pub skipped: Vec<SkippedSymbol>,
    pub total_requested: usize,
    pub timestamp: DateTime<Utc>,
}

fn scan_entry(
    engine: &QuantAnalysisEngine,
    symbol: &str,
    bars: &[Bar],
) -> Result<ScanEntry, AnalysisError> {
    let metrics = engine.compute_metrics(bars)?;
    let recommendation = engine.recommend(&metrics, None);
    Ok(ScanEntry {
        symbol: symbol.to_string(),
        score: recommendation.score,
        recommendation: recommendation.recommendation,
        confidence: recommendation.confidence,
        current_price: bars[bars.len() - 1].close,
        total_return_pct: metrics.total_return_pct(),
        annualized_volatility_pct: metrics.annualized_volatility_pct(),
        sharpe_ratio: metrics.sharpe_ratio,
        max_drawdown_pct: metrics.max_drawdown_pct(),
    })
}

impl AnalysisOrchestrator {
    /// Score every symbol in `symbols` (the configured scan list when `None`).
    ///
    /// Histories are fetched concurrently and the metrics computed in
    /// parallel. Symbols that fail to fetch or have too little data are
    /// listed in `skipped`. Repeated symbols are scanned once. Entries are
    /// sorted by score, best first, then by symbol.
    pub async fn scan(&self, symbols: Option<&[String]>, period: Option<Period>) -> ScanResult {
        let mut seen = HashSet::new();
        let symbols: Vec<String> = symbols
            .unwrap_or(&self.config().scan_symbols)
            .iter()
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty() && seen.insert(s.clone()))
            .collect();
        let period = period.unwrap_or(self.config().analysis_period);
        let total_requested = symbols.len();

        tracing::info!("📊 Starting market scan of {} symbols over {}", total_requested, period);

        let fetched = join_all(symbols.into_iter().map(|symbol| async move {
            let result = self.daily_history(&symbol, period).await;
            (symbol, result)
        }))
        .await;

        let engine = *self.quant_engine();
        let scored: Vec<(String, Result<ScanEntry, AnalysisError>)> = fetched
            .into_par_iter()
            .map(|(symbol, bars)| {
                let entry = bars.and_then(|bars| scan_entry(&engine, &symbol, &bars));
                (symbol, entry)
            })
            .collect();

        let mut entries = Vec::new();
        let mut skipped = Vec::new();
        for (symbol, result) in scored {
            match result {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::warn!("Skipping {} in scan: {}", symbol, e);
                    skipped.push(SkippedSymbol {
                        symbol,
                        reason: e.to_string(),
                    });
                }
            }
        }

        entries.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.symbol.cmp(&b.symbol)));

        tracing::info!(
            "✅ Scan complete: {}/{} symbols scored",
            entries.len(),
            total_requested
        );

        ScanResult {
            period,
            entries,
            skipped,
            total_requested,
            timestamp: Utc::now(),
        }
    }
}
