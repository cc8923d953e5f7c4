use std::collections::BTreeMap;

use analysis_core::{stats, AnalysisError, Bar, TRADING_DAYS_PER_YEAR};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::returns::ReturnSeries;

/// Human-readable reading of beta and alpha.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkInterpretation {
    pub beta: String,
    pub alpha: String,
}

/// Market-relative metrics computed over the overlapping return dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkMetrics {
    pub beta: f64,
    /// Annualized return not explained by beta, in percent.
    pub alpha_pct: f64,
    pub information_ratio: f64,
    pub overlapping_days: usize,
    pub interpretation: BenchmarkInterpretation,
}

/// Compare a series with a benchmark series.
///
/// Returns are computed per series first, then aligned on exact timestamps.
/// Dates present in only one series are dropped.
pub fn compute_benchmark_metrics(
    series: &[Bar],
    benchmark: &[Bar],
) -> Result<BenchmarkMetrics, AnalysisError> {
    if benchmark.is_empty() {
        return Err(AnalysisError::NoBenchmarkData);
    }
    if series.len() < 2 {
        return Err(AnalysisError::insufficient("benchmark comparison", 2, series.len()));
    }

    let (stock, market) = align_returns(
        &ReturnSeries::from_bars(series),
        &ReturnSeries::from_bars(benchmark),
    );
    if stock.len() < 2 {
        return Err(AnalysisError::InsufficientOverlap { overlap: stock.len() });
    }

    let market_flat = stats::is_negligible(stats::std_dev(&market), stats::mean(&market));
    let beta = if market_flat {
        0.0
    } else {
        stats::covariance(&stock, &market) / stats::variance(&market)
    };

    let alpha = if !market_flat {
        let stock_annual = stats::mean(&stock) * TRADING_DAYS_PER_YEAR;
        let market_annual = stats::mean(&market) * TRADING_DAYS_PER_YEAR;
        stock_annual - beta * market_annual
    } else {
        0.0
    };
    let alpha_pct = alpha * 100.0;

    let active: Vec<f64> = stock.iter().zip(market.iter()).map(|(s, m)| s - m).collect();
    let tracking_error = stats::std_dev(&active);
    let active_mean = stats::mean(&active);
    let information_ratio = if stats::is_negligible(tracking_error, active_mean) {
        0.0
    } else {
        active_mean / tracking_error * TRADING_DAYS_PER_YEAR.sqrt()
    };

    Ok(BenchmarkMetrics {
        beta,
        alpha_pct,
        information_ratio,
        overlapping_days: stock.len(),
        interpretation: BenchmarkInterpretation {
            beta: beta_label(beta).to_string(),
            alpha: alpha_label(alpha_pct).to_string(),
        },
    })
}

/// Pairs of (stock, market) returns sharing a timestamp, in time order.
fn align_returns(stock: &ReturnSeries, market: &ReturnSeries) -> (Vec<f64>, Vec<f64>) {
    let market_by_ts: BTreeMap<DateTime<Utc>, f64> = market
        .timestamps
        .iter()
        .copied()
        .zip(market.simple.iter().copied())
        .collect();

    let mut pairs: BTreeMap<DateTime<Utc>, (f64, f64)> = BTreeMap::new();
    for (ts, r) in stock.timestamps.iter().zip(stock.simple.iter()) {
        if let Some(m) = market_by_ts.get(ts) {
            pairs.insert(*ts, (*r, *m));
        }
    }

    pairs.into_values().unzip()
}

fn beta_label(beta: f64) -> &'static str {
    if beta > 1.0 {
        "More volatile than market"
    } else if beta < 1.0 {
        "Less volatile than market"
    } else {
        "Same volatility as market"
    }
}

fn alpha_label(alpha_pct: f64) -> &'static str {
    if alpha_pct > 0.0 {
        "Outperforming market"
    } else if alpha_pct < 0.0 {
        "Underperforming market"
    } else {
        "Matching market"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bars_from(start_day: u32, closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar {
                timestamp: Utc.with_ymd_and_hms(2024, 5, start_day, 0, 0, 0).unwrap()
                    + chrono::Duration::days(i as i64),
                open: c,
                high: c,
                low: c,
                close: c,
                volume: 500_000.0,
                vwap: None,
            })
            .collect()
    }

    const CLOSES: [f64; 8] = [100.0, 102.0, 99.0, 103.0, 104.0, 101.0, 105.0, 107.0];

    #[test]
    fn test_identical_benchmark() {
        let series = bars_from(1, &CLOSES);
        let m = compute_benchmark_metrics(&series, &series).unwrap();
        assert!((m.beta - 1.0).abs() < 1e-12);
        assert!(m.alpha_pct.abs() < 1e-9);
        assert_eq!(m.information_ratio, 0.0);
        assert_eq!(m.overlapping_days, 7);
    }

    #[test]
    fn test_leveraged_series_has_higher_beta() {
        let market = bars_from(1, &CLOSES);
        // Twice the daily move of the market
        let mut closes = vec![100.0];
        for w in CLOSES.windows(2) {
            let r = w[1] / w[0] - 1.0;
            let last = closes[closes.len() - 1];
            closes.push(last * (1.0 + 2.0 * r));
        }
        let stock = bars_from(1, &closes);
        let m = compute_benchmark_metrics(&stock, &market).unwrap();
        assert!((m.beta - 2.0).abs() < 1e-9);
        assert_eq!(m.interpretation.beta, "More volatile than market");
    }

    #[test]
    fn test_empty_benchmark() {
        let series = bars_from(1, &CLOSES);
        assert_eq!(
            compute_benchmark_metrics(&series, &[]),
            Err(AnalysisError::NoBenchmarkData)
        );
    }

    #[test]
    fn test_short_series() {
        let series = bars_from(1, &[100.0]);
        let market = bars_from(1, &CLOSES);
        assert!(matches!(
            compute_benchmark_metrics(&series, &market),
            Err(AnalysisError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_disjoint_dates() {
        let series = bars_from(1, &CLOSES[..4]);
        let market = bars_from(20, &CLOSES[..4]);
        assert_eq!(
            compute_benchmark_metrics(&series, &market),
            Err(AnalysisError::InsufficientOverlap { overlap: 0 })
        );
    }

    #[test]
    fn test_partial_overlap_uses_shared_dates_only() {
        let series = bars_from(1, &CLOSES);
        let market = bars_from(4, &CLOSES);
        let m = compute_benchmark_metrics(&series, &market).unwrap();
        // stock returns end on days 2..=8, market returns on days 5..=11
        assert_eq!(m.overlapping_days, 4);
    }

    #[test]
    fn test_flat_benchmark_zero_beta() {
        let series = bars_from(1, &CLOSES);
        let market = bars_from(1, &[400.0; 8]);
        let m = compute_benchmark_metrics(&series, &market).unwrap();
        assert_eq!(m.beta, 0.0);
        assert_eq!(m.alpha_pct, 0.0);
        assert_eq!(m.interpretation.alpha, "Matching market");
    }

    #[test]
    fn test_constant_growth_benchmark_zero_beta() {
        // Identical daily returns up to rounding residue
        let growth: Vec<f64> = (0..8).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        let market = bars_from(1, &growth);
        let m = compute_benchmark_metrics(&bars_from(1, &CLOSES), &market).unwrap();
        assert_eq!(m.beta, 0.0);
        assert_eq!(m.alpha_pct, 0.0);

        // Stock tracking the benchmark at a fixed daily spread
        let spread: Vec<f64> = (0..8).map(|i| 100.0 * 1.02_f64.powi(i)).collect();
        let m = compute_benchmark_metrics(&bars_from(1, &spread), &market).unwrap();
        assert_eq!(m.information_ratio, 0.0);
    }
}
