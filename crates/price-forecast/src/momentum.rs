use analysis_core::{closes, AnalysisError, Bar};

use crate::indicators::last_sma;
use crate::{forecast_dates, Forecaster, MethodDetails, MethodForecast, PricePoint};

const RECENT_WINDOW: usize = 30;
const MOMENTUM_LOOKBACK: usize = 10;
const CONFIDENCE: f64 = 0.65;

/// Weighted blend of the 5/10/20-bar SMAs as the base level, plus half of
/// the recent daily momentum per forecast day.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmoothedMomentumForecaster;

impl Forecaster for SmoothedMomentumForecaster {
    fn name(&self) -> &'static str {
        "Moving Average"
    }

    fn min_bars(&self) -> usize {
        20
    }

    fn forecast(&self, bars: &[Bar], horizon_days: usize) -> Result<MethodForecast, AnalysisError> {
        self.check_input(bars, horizon_days)?;

        let recent = &bars[bars.len().saturating_sub(RECENT_WINDOW)..];
        let prices = closes(recent);
        let n = prices.len();

        let (sma_5, sma_10, sma_20) = match (
            last_sma(&prices, 5),
            last_sma(&prices, 10),
            last_sma(&prices, 20),
        ) {
            (Some(a), Some(b), Some(c)) => (a, b, c),
            _ => return Err(AnalysisError::insufficient("moving averages", 20, n)),
        };

        let current_price = prices[n - 1];
        let base = sma_5 * 0.5 + sma_10 * 0.3 + sma_20 * 0.2;
        let daily_momentum =
            (current_price - prices[n - MOMENTUM_LOOKBACK]) / MOMENTUM_LOOKBACK as f64;

        let last_date = recent[n - 1].date();
        let predictions = forecast_dates(last_date, horizon_days)?
            .into_iter()
            .enumerate()
            .map(|(i, date)| PricePoint {
                date,
                predicted_price: base + daily_momentum * (i + 1) as f64 * 0.5,
                confidence: CONFIDENCE,
            })
            .collect();

        Ok(MethodForecast {
            method: self.name().to_string(),
            predictions,
            current_price,
            details: MethodDetails::SmoothedMomentum { sma_5, sma_10, sma_20 },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn bars(closes: &[f64]) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar {
                timestamp: start + Duration::days(i as i64),
                open: c,
                high: c,
                low: c,
                close: c,
                volume: 10_000.0,
                vwap: None,
            })
            .collect()
    }

    #[test]
    fn test_flat_series_predicts_flat() {
        let forecast = SmoothedMomentumForecaster.forecast(&bars(&[75.0; 25]), 4).unwrap();
        assert_eq!(forecast.predictions.len(), 4);
        for p in &forecast.predictions {
            assert!((p.predicted_price - 75.0).abs() < 1e-12);
            assert_eq!(p.confidence, 0.65);
        }
    }

    #[test]
    fn test_linear_ramp() {
        // close[i] = i, 40 bars; the recent window is bars 10..40
        let closes: Vec<f64> = (0..40).map(|i| i as f64).collect();
        let forecast = SmoothedMomentumForecaster.forecast(&bars(&closes), 2).unwrap();

        let (sma_5, sma_10, sma_20) = (37.0, 34.5, 29.5);
        assert_eq!(
            forecast.details,
            MethodDetails::SmoothedMomentum { sma_5, sma_10, sma_20 }
        );
        let base = sma_5 * 0.5 + sma_10 * 0.3 + sma_20 * 0.2;
        // momentum = (39 - 30) / 10
        assert!((forecast.predictions[0].predicted_price - (base + 0.9 * 0.5)).abs() < 1e-9);
        assert!((forecast.predictions[1].predicted_price - (base + 0.9 * 1.0)).abs() < 1e-9);
    }

    #[test]
    fn test_minimum_bars() {
        assert!(matches!(
            SmoothedMomentumForecaster.forecast(&bars(&[10.0; 19]), 3),
            Err(AnalysisError::InsufficientData { required: 20, actual: 19, .. })
        ));
    }
}
