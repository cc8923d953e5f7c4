use analysis_core::{stats, AnalysisError, Bar, TRADING_DAYS_PER_YEAR};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::returns::ReturnSeries;

/// Return statistics. Every field is a percentage (5.23 means 5.23%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnsMetrics {
    pub total_return_pct: f64,
    pub daily_return_mean_pct: f64,
    pub daily_return_std_pct: f64,
    pub annualized_return_pct: f64,
    pub annualized_volatility_pct: f64,
    pub max_return_pct: f64,
    pub min_return_pct: f64,
    pub cumulative_return_pct: f64,
}

/// Value at Risk at one confidence level and horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarEstimate {
    pub confidence_level: f64,
    pub time_horizon_days: u32,
    pub historical_var_pct: f64,
    pub parametric_var_pct: f64,
    pub interpretation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownAnalysis {
    pub max_drawdown_pct: f64,
    pub peak_date: NaiveDate,
    pub trough_date: NaiveDate,
    /// Bars from the trough to the end of the window; `None` when the trough
    /// is the last bar (the window ended, which is not the same as "never recovered").
    pub recovery_period_days: Option<usize>,
    pub current_drawdown_pct: f64,
}

/// Snapshot of every derived metric for one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsBundle {
    pub risk_free_rate: f64,
    pub bars: usize,
    pub returns: ReturnsMetrics,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub var_95: VarEstimate,
    pub var_99: VarEstimate,
    pub cvar_95: f64,
    pub drawdown: DrawdownAnalysis,
}

impl MetricsBundle {
    pub fn total_return_pct(&self) -> f64 {
        self.returns.total_return_pct
    }

    pub fn annualized_volatility_pct(&self) -> f64 {
        self.returns.annualized_volatility_pct
    }

    pub fn max_drawdown_pct(&self) -> f64 {
        self.drawdown.max_drawdown_pct
    }

    pub fn current_drawdown_pct(&self) -> f64 {
        self.drawdown.current_drawdown_pct
    }

    /// Sharpe ratio re-expressed against a different risk-free rate.
    pub fn sharpe_at(&self, risk_free_rate: f64) -> f64 {
        let volatility = self.returns.annualized_volatility_pct / 100.0;
        if stats::is_negligible(volatility, self.returns.annualized_return_pct / 100.0) {
            return 0.0;
        }
        (self.returns.annualized_return_pct / 100.0 - risk_free_rate) / volatility
    }
}

/// Compute the full metrics bundle for a series.
pub fn compute_metrics(bars: &[Bar], risk_free_rate: f64) -> Result<MetricsBundle, AnalysisError> {
    let returns = ReturnSeries::from_bars(bars);
    if bars.len() < 2 || returns.is_empty() {
        return Err(AnalysisError::insufficient(
            "quantitative metrics",
            2,
            bars.len(),
        ));
    }

    let returns_metrics = returns_metrics(bars, &returns)?;
    let threshold_95 = historical_var_threshold(&returns.simple, 0.95);

    Ok(MetricsBundle {
        risk_free_rate,
        bars: bars.len(),
        returns: returns_metrics,
        sharpe_ratio: sharpe_ratio(&returns.simple, risk_free_rate),
        sortino_ratio: sortino_ratio(&returns.simple, risk_free_rate, 0.0),
        var_95: value_at_risk(&returns.simple, 0.95, 1),
        var_99: value_at_risk(&returns.simple, 0.99, 1),
        cvar_95: conditional_var(&returns.simple, threshold_95),
        drawdown: max_drawdown(bars)?,
    })
}

/// Calculate return-based metrics
pub fn returns_metrics(
    bars: &[Bar],
    returns: &ReturnSeries,
) -> Result<ReturnsMetrics, AnalysisError> {
    if bars.len() < 2 || returns.is_empty() {
        return Err(AnalysisError::insufficient("return metrics", 2, bars.len()));
    }

    let r = &returns.simple;
    let first = bars[0].close;
    let last = bars[bars.len() - 1].close;
    let total_return = (last / first - 1.0) * 100.0;

    let mean_pct = stats::mean(r) * 100.0;
    let std_pct = stats::std_dev(r) * 100.0;

    let cumulative = r.iter().fold(1.0, |acc, x| acc * (1.0 + x)) - 1.0;
    let max_return = r.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let min_return = r.iter().cloned().fold(f64::INFINITY, f64::min);

    Ok(ReturnsMetrics {
        total_return_pct: total_return,
        daily_return_mean_pct: mean_pct,
        daily_return_std_pct: std_pct,
        annualized_return_pct: mean_pct * TRADING_DAYS_PER_YEAR,
        annualized_volatility_pct: std_pct * TRADING_DAYS_PER_YEAR.sqrt(),
        max_return_pct: max_return * 100.0,
        min_return_pct: min_return * 100.0,
        cumulative_return_pct: cumulative * 100.0,
    })
}

/// Calculate Sharpe Ratio (annualized).
/// Zero volatility or fewer than 2 returns yield 0.0.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }

    let volatility = stats::std_dev(returns) * TRADING_DAYS_PER_YEAR.sqrt();
    let annualized_return = stats::mean(returns) * TRADING_DAYS_PER_YEAR;
    if stats::is_negligible(volatility, annualized_return) {
        return 0.0;
    }

    (annualized_return - risk_free_rate) / volatility
}

/// Calculate Sortino Ratio (downside deviation of returns below `target_return` only)
pub fn sortino_ratio(returns: &[f64], risk_free_rate: f64, target_return: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }

    let downside: Vec<f64> = returns.iter().copied().filter(|&r| r < target_return).collect();
    let downside_dev = stats::std_dev(&downside) * TRADING_DAYS_PER_YEAR.sqrt();
    let annualized_return = stats::mean(returns) * TRADING_DAYS_PER_YEAR;
    if stats::is_negligible(downside_dev, annualized_return) {
        return 0.0;
    }

    (annualized_return - risk_free_rate) / downside_dev
}

/// The (1 - confidence) percentile of the raw return distribution (not in percent).
pub fn historical_var_threshold(returns: &[f64], confidence_level: f64) -> f64 {
    stats::percentile(returns, (1.0 - confidence_level) * 100.0)
}

/// Standard-normal quantile magnitude for the tail at `confidence_level`.
fn normal_quantile_magnitude(confidence_level: f64) -> f64 {
    let p = (1.0 - confidence_level).clamp(f64::EPSILON, 1.0 - f64::EPSILON);
    match Normal::new(0.0, 1.0) {
        Ok(normal) => normal.inverse_cdf(p).abs(),
        Err(_) => 0.0,
    }
}

/// Historical and parametric VaR, scaled by the square root of the horizon.
pub fn value_at_risk(
    returns: &[f64],
    confidence_level: f64,
    time_horizon_days: u32,
) -> VarEstimate {
    let scale = (time_horizon_days.max(1) as f64).sqrt();

    let historical = historical_var_threshold(returns, confidence_level) * 100.0;
    let z = normal_quantile_magnitude(confidence_level);
    let parametric = (stats::mean(returns) - z * stats::std_dev(returns)) * 100.0;

    let historical_var_pct = historical * scale;
    let parametric_var_pct = parametric * scale;

    VarEstimate {
        confidence_level,
        time_horizon_days: time_horizon_days.max(1),
        historical_var_pct,
        parametric_var_pct,
        interpretation: format!(
            "With {}% confidence, maximum loss in {} day(s) won't exceed {:.2}%",
            confidence_level * 100.0,
            time_horizon_days.max(1),
            historical_var_pct.abs()
        ),
    }
}

/// CVaR / Expected Shortfall: mean of returns at or below `threshold`, in percent.
pub fn conditional_var(returns: &[f64], threshold: f64) -> f64 {
    let tail: Vec<f64> = returns.iter().copied().filter(|&r| r <= threshold).collect();
    if tail.is_empty() {
        return 0.0;
    }
    stats::mean(&tail) * 100.0
}

/// CVaR at a confidence level, using the historical VaR threshold.
pub fn cvar(returns: &[f64], confidence_level: f64) -> f64 {
    conditional_var(returns, historical_var_threshold(returns, confidence_level))
}

/// Calculate maximum drawdown, its peak/trough dates and the current drawdown
pub fn max_drawdown(bars: &[Bar]) -> Result<DrawdownAnalysis, AnalysisError> {
    if bars.len() < 2 {
        return Err(AnalysisError::insufficient("drawdown analysis", 2, bars.len()));
    }

    let mut running_max = bars[0].close;
    let drawdowns: Vec<f64> = bars
        .iter()
        .map(|b| {
            if b.close > running_max {
                running_max = b.close;
            }
            if running_max > 0.0 {
                (b.close - running_max) / running_max * 100.0
            } else {
                0.0
            }
        })
        .collect();

    // First occurrence of the deepest drawdown
    let mut trough = 0;
    for (i, &dd) in drawdowns.iter().enumerate() {
        if dd < drawdowns[trough] {
            trough = i;
        }
    }

    // Highest close up to and including the trough
    let mut peak = 0;
    for i in 0..=trough {
        if bars[i].close > bars[peak].close {
            peak = i;
        }
    }

    let last = bars.len() - 1;
    let recovery_period_days = if trough < last { Some(last - trough) } else { None };

    Ok(DrawdownAnalysis {
        max_drawdown_pct: drawdowns[trough],
        peak_date: bars[peak].date(),
        trough_date: bars[trough].date(),
        recovery_period_days,
        current_drawdown_pct: drawdowns[last],
    })
}
