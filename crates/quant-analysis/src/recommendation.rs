use std::fmt;

use serde::{Deserialize, Serialize};

use crate::benchmark::BenchmarkMetrics;
use crate::metrics::MetricsBundle;

pub const DISCLAIMER: &str = "This recommendation is based solely on historical quantitative metrics \
and should not be considered as financial advice. Always conduct thorough research and consider \
your personal financial situation before making investment decisions.";

/// Five ordered recommendation tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RecommendationLabel {
    #[serde(rename = "STRONG SELL")]
    StrongSell,
    #[serde(rename = "SELL")]
    Sell,
    #[serde(rename = "HOLD")]
    Hold,
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "STRONG BUY")]
    StrongBuy,
}

impl RecommendationLabel {
    pub fn from_score(score: i32) -> Self {
        if score >= 4 {
            RecommendationLabel::StrongBuy
        } else if score >= 2 {
            RecommendationLabel::Buy
        } else if score >= 0 {
            RecommendationLabel::Hold
        } else if score >= -2 {
            RecommendationLabel::Sell
        } else {
            RecommendationLabel::StrongSell
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationLabel::StrongBuy => "STRONG BUY",
            RecommendationLabel::Buy => "BUY",
            RecommendationLabel::Hold => "HOLD",
            RecommendationLabel::Sell => "SELL",
            RecommendationLabel::StrongSell => "STRONG SELL",
        }
    }

    /// Only the two outer tiers carry high confidence.
    pub fn confidence(&self) -> Confidence {
        match self {
            RecommendationLabel::StrongBuy | RecommendationLabel::StrongSell => Confidence::High,
            _ => Confidence::Moderate,
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            RecommendationLabel::StrongBuy => {
                "Consider accumulating position. Strong fundamentals and performance metrics."
            }
            RecommendationLabel::Buy => {
                "Consider initiating or adding to position. Positive indicators outweigh concerns."
            }
            RecommendationLabel::Hold => {
                "Maintain current position. Mixed signals suggest waiting for clearer trend."
            }
            RecommendationLabel::Sell => {
                "Consider reducing position. Negative indicators suggest caution."
            }
            RecommendationLabel::StrongSell => {
                "Consider exiting position. Multiple negative indicators present."
            }
        }
    }
}

impl fmt::Display for RecommendationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Moderate,
}

/// Scored investment signal with its supporting and opposing reasons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub recommendation: RecommendationLabel,
    pub confidence: Confidence,
    pub score: i32,
    pub action: String,
    pub positive_signals: Vec<String>,
    pub risk_warnings: Vec<String>,
    pub summary: String,
    pub disclaimer: String,
}

/// Rule-based scorer over a metrics bundle and optional benchmark metrics.
///
/// Rules are applied in a fixed order so the signal and warning lists come
/// out in the same order on every call. Some rules only add text and leave
/// the score untouched (moderate drawdown, VaR, beta).
pub fn synthesize_recommendation(
    metrics: &MetricsBundle,
    benchmark: Option<&BenchmarkMetrics>,
    risk_free_rate: f64,
) -> Recommendation {
    let mut score: i32 = 0;
    let mut signals: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    // Sharpe
    let sharpe = metrics.sharpe_at(risk_free_rate);
    if sharpe > 2.0 {
        score += 2;
        signals.push("Excellent risk-adjusted returns (Sharpe > 2)".to_string());
    } else if sharpe > 1.0 {
        score += 1;
        signals.push("Good risk-adjusted returns (Sharpe > 1)".to_string());
    } else if sharpe < 0.0 {
        score -= 2;
        warnings.push("Negative risk-adjusted returns".to_string());
    } else {
        warnings.push("Below-average risk-adjusted returns".to_string());
    }

    // Alpha
    if let Some(bm) = benchmark {
        let alpha = bm.alpha_pct;
        if alpha > 5.0 {
            score += 2;
            signals.push(format!("Strong outperformance vs benchmark (Alpha: {:.2}%)", alpha));
        } else if alpha > 0.0 {
            score += 1;
            signals.push(format!("Modest outperformance vs benchmark (Alpha: {:.2}%)", alpha));
        } else if alpha < -5.0 {
            score -= 2;
            warnings.push(format!("Underperforming benchmark (Alpha: {:.2}%)", alpha));
        } else {
            warnings.push("Slight underperformance vs benchmark".to_string());
        }
    }

    // Returns and volatility
    let total_return = metrics.total_return_pct();
    let volatility = metrics.annualized_volatility_pct();
    if total_return > 20.0 && volatility < 30.0 {
        score += 2;
        signals.push(format!(
            "Strong returns ({:.1}%) with reasonable volatility",
            total_return
        ));
    } else if total_return > 10.0 {
        score += 1;
        signals.push(format!("Positive returns ({:.1}%)", total_return));
    } else if total_return < -10.0 {
        score -= 2;
        warnings.push(format!("Negative returns ({:.1}%)", total_return));
    }

    if volatility > 50.0 {
        score -= 1;
        warnings.push(format!("High volatility ({:.1}%)", volatility));
    }

    // Drawdown
    let current_dd = metrics.current_drawdown_pct();
    if current_dd < -15.0 {
        score -= 1;
        warnings.push(format!("Currently in significant drawdown ({:.1}%)", current_dd));
    } else if current_dd < -5.0 {
        warnings.push(format!("Currently in moderate drawdown ({:.1}%)", current_dd));
    }

    let max_dd = metrics.max_drawdown_pct();
    if max_dd < -30.0 {
        score -= 1;
        warnings.push(format!("Experienced severe drawdown ({:.1}%)", max_dd));
    }

    // Tail risk
    let var_value = metrics.var_95.historical_var_pct.abs();
    if var_value > 5.0 {
        warnings.push(format!("High daily risk (VaR: {:.1}%)", var_value));
    }

    // Beta
    if let Some(bm) = benchmark {
        if bm.beta > 1.5 {
            warnings.push(format!("Much more volatile than market (Beta: {:.2})", bm.beta));
        } else if bm.beta < 0.5 {
            signals.push(format!("Low correlation with market (Beta: {:.2})", bm.beta));
        }
    }

    let label = RecommendationLabel::from_score(score);
    let summary = format!(
        "Based on quantitative analysis, the recommendation is {}. Score: {}/10. {} positive signals, {} warnings.",
        label,
        score,
        signals.len(),
        warnings.len()
    );

    Recommendation {
        recommendation: label,
        confidence: label.confidence(),
        score,
        action: label.action().to_string(),
        positive_signals: signals,
        risk_warnings: warnings,
        summary,
        disclaimer: DISCLAIMER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::BenchmarkInterpretation;
    use crate::metrics::{DrawdownAnalysis, ReturnsMetrics, VarEstimate};
    use chrono::NaiveDate;

    fn var(historical: f64) -> VarEstimate {
        VarEstimate {
            confidence_level: 0.95,
            time_horizon_days: 1,
            historical_var_pct: historical,
            parametric_var_pct: historical,
            interpretation: String::new(),
        }
    }

    /// Bundle with the given annualized return/volatility (percent) and drawdowns.
    fn bundle(
        total: f64,
        annual_return: f64,
        annual_vol: f64,
        max_dd: f64,
        current_dd: f64,
        var_95: f64,
    ) -> MetricsBundle {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        MetricsBundle {
            risk_free_rate: 0.02,
            bars: 252,
            returns: ReturnsMetrics {
                total_return_pct: total,
                daily_return_mean_pct: annual_return / 252.0,
                daily_return_std_pct: annual_vol / 252.0_f64.sqrt(),
                annualized_return_pct: annual_return,
                annualized_volatility_pct: annual_vol,
                max_return_pct: 3.0,
                min_return_pct: -3.0,
                cumulative_return_pct: total,
            },
            sharpe_ratio: 0.0,
            sortino_ratio: 0.0,
            var_95: var(var_95),
            var_99: var(var_95 * 1.4),
            cvar_95: var_95 * 1.2,
            drawdown: DrawdownAnalysis {
                max_drawdown_pct: max_dd,
                peak_date: date,
                trough_date: date,
                recovery_period_days: None,
                current_drawdown_pct: current_dd,
            },
        }
    }

    fn benchmark(beta: f64, alpha_pct: f64) -> BenchmarkMetrics {
        BenchmarkMetrics {
            beta,
            alpha_pct,
            information_ratio: 0.3,
            overlapping_days: 250,
            interpretation: BenchmarkInterpretation {
                beta: String::new(),
                alpha: String::new(),
            },
        }
    }

    #[test]
    fn test_label_boundaries() {
        assert_eq!(RecommendationLabel::from_score(4), RecommendationLabel::StrongBuy);
        assert_eq!(RecommendationLabel::from_score(2), RecommendationLabel::Buy);
        assert_eq!(RecommendationLabel::from_score(0), RecommendationLabel::Hold);
        assert_eq!(RecommendationLabel::from_score(-2), RecommendationLabel::Sell);
        assert_eq!(RecommendationLabel::from_score(-3), RecommendationLabel::StrongSell);
        assert_eq!(RecommendationLabel::from_score(-3).confidence(), Confidence::High);
        assert_eq!(RecommendationLabel::from_score(1).confidence(), Confidence::Moderate);
    }

    #[test]
    fn test_strong_buy_profile() {
        // Sharpe = (0.40 - 0.02) / 0.15 > 2
        let metrics = bundle(35.0, 40.0, 15.0, -8.0, -1.0, -1.5);
        let rec = synthesize_recommendation(&metrics, Some(&benchmark(0.4, 7.5)), 0.02);
        // +2 sharpe, +2 alpha, +2 returns
        assert_eq!(rec.score, 6);
        assert_eq!(rec.recommendation, RecommendationLabel::StrongBuy);
        assert_eq!(rec.confidence, Confidence::High);
        assert_eq!(
            rec.positive_signals,
            vec![
                "Excellent risk-adjusted returns (Sharpe > 2)".to_string(),
                "Strong outperformance vs benchmark (Alpha: 7.50%)".to_string(),
                "Strong returns (35.0%) with reasonable volatility".to_string(),
                "Low correlation with market (Beta: 0.40)".to_string(),
            ]
        );
        assert!(rec.risk_warnings.is_empty());
        assert!(rec.summary.contains("STRONG BUY"));
        assert!(rec.summary.contains("Score: 6/10. 4 positive signals, 0 warnings."));
    }

    #[test]
    fn test_strong_sell_profile() {
        let metrics = bundle(-25.0, -30.0, 60.0, -45.0, -20.0, -6.2);
        let rec = synthesize_recommendation(&metrics, Some(&benchmark(1.8, -9.0)), 0.02);
        // -2 sharpe, -2 alpha, -2 returns, -1 vol, -1 current dd, -1 max dd
        assert_eq!(rec.score, -9);
        assert_eq!(rec.recommendation, RecommendationLabel::StrongSell);
        assert_eq!(
            rec.risk_warnings,
            vec![
                "Negative risk-adjusted returns".to_string(),
                "Underperforming benchmark (Alpha: -9.00%)".to_string(),
                "Negative returns (-25.0%)".to_string(),
                "High volatility (60.0%)".to_string(),
                "Currently in significant drawdown (-20.0%)".to_string(),
                "Experienced severe drawdown (-45.0%)".to_string(),
                "High daily risk (VaR: 6.2%)".to_string(),
                "Much more volatile than market (Beta: 1.80)".to_string(),
            ]
        );
        assert_eq!(rec.action, RecommendationLabel::StrongSell.action());
    }

    #[test]
    fn test_warning_only_rules_do_not_move_score() {
        // Sharpe between 0 and 1, flat returns, moderate drawdown, high VaR
        let metrics = bundle(2.0, 8.0, 20.0, -12.0, -7.0, -5.5);
        let rec = synthesize_recommendation(&metrics, None, 0.02);
        assert_eq!(rec.score, 0);
        assert_eq!(rec.recommendation, RecommendationLabel::Hold);
        assert_eq!(
            rec.risk_warnings,
            vec![
                "Below-average risk-adjusted returns".to_string(),
                "Currently in moderate drawdown (-7.0%)".to_string(),
                "High daily risk (VaR: 5.5%)".to_string(),
            ]
        );
        assert!(rec.positive_signals.is_empty());
    }

    #[test]
    fn test_slight_underperformance_without_score_change() {
        let metrics = bundle(12.0, 20.0, 15.0, -4.0, 0.0, -1.0);
        let rec = synthesize_recommendation(&metrics, Some(&benchmark(1.0, -2.0)), 0.02);
        // +1 sharpe (1.2), +1 returns
        assert_eq!(rec.score, 2);
        assert_eq!(rec.recommendation, RecommendationLabel::Buy);
        assert_eq!(rec.risk_warnings, vec!["Slight underperformance vs benchmark".to_string()]);
    }

    #[test]
    fn test_risk_free_rate_shifts_sharpe_rule() {
        // Sharpe is 1.07 at 2% but 0.93 at 4%
        let metrics = bundle(5.0, 17.0, 14.0, -4.0, 0.0, -1.0);
        let low = synthesize_recommendation(&metrics, None, 0.02);
        let high = synthesize_recommendation(&metrics, None, 0.04);
        assert_eq!(low.score, 1);
        assert_eq!(high.score, 0);
    }

    #[test]
    fn test_deterministic() {
        let metrics = bundle(15.0, 18.0, 25.0, -20.0, -6.0, -2.0);
        let bm = benchmark(1.2, 1.0);
        let a = synthesize_recommendation(&metrics, Some(&bm), 0.02);
        let b = synthesize_recommendation(&metrics, Some(&bm), 0.02);
        assert_eq!(a, b);
        assert!(a.disclaimer.contains("not be considered as financial advice"));
    }

    #[test]
    fn test_label_serializes_with_space() {
        let json = serde_json::to_string(&RecommendationLabel::StrongBuy).unwrap();
        assert_eq!(json, "\"STRONG BUY\"");
    }
}
