use super::*;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;
use statrs::distribution::Normal;

// ── Helpers ─────────────────────────────────────────────────────────

fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 21, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar {
            timestamp: start + Duration::days(i as i64),
            open: c,
            high: c * 1.01,
            low: c * 0.99,
            close: c,
            volume: 2_000_000.0,
            vwap: None,
        })
        .collect()
}

fn random_walk(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 2.0).unwrap();
    let mut price = 100.0_f64;
    (0..n)
        .map(|_| {
            let current = price;
            price = (price + normal.sample(&mut rng)).max(50.0);
            current
        })
        .collect()
}

// ── Ensemble ────────────────────────────────────────────────────────

#[test]
fn test_seven_day_forecast_dates() {
    let bars = make_bars(&random_walk(90, 42));
    let forecast = forecast_ensemble(&bars, 7).unwrap();

    assert_eq!(forecast.predictions.len(), 7);
    let last = bars[89].date();
    for (i, point) in forecast.predictions.iter().enumerate() {
        assert_eq!(point.date, last + Duration::days(i as i64 + 1));
    }
    assert_eq!(forecast.last_date, last);
    assert_eq!(forecast.current_price, bars[89].close);
}

#[test]
fn test_band_is_min_and_max_of_estimators() {
    let bars = make_bars(&random_walk(90, 7));
    let forecast = forecast_ensemble(&bars, 10).unwrap();
    assert_eq!(forecast.methods_used.len(), 3);

    let trend = TrendForecaster.forecast(&bars, 10).unwrap();
    let smoothed = SmoothedMomentumForecaster.forecast(&bars, 10).unwrap();
    let multi = MultiFeatureForecaster.forecast(&bars, 10).unwrap();

    for (i, point) in forecast.predictions.iter().enumerate() {
        let prices = [
            trend.predictions[i].predicted_price,
            smoothed.predictions[i].predicted_price,
            multi.predictions[i].predicted_price,
        ];
        let min = prices.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = prices.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(point.conservative, min);
        assert_eq!(point.optimistic, max);
        assert!(point.conservative <= point.optimistic);

        let moderate = prices[0] * 0.3 + prices[1] * 0.4 + prices[2] * 0.3;
        assert!((point.moderate - moderate).abs() < 1e-9);
        let change = (moderate - forecast.current_price) / forecast.current_price * 100.0;
        assert!((point.change_percent_moderate - change).abs() < 1e-9);
    }
}

#[test]
fn test_without_multi_feature_estimator() {
    // 45 bars: enough for trend and smoothed momentum, not for the multi-feature model
    let bars = make_bars(&random_walk(45, 3));
    let forecast = forecast_ensemble(&bars, 5).unwrap();
    assert_eq!(
        forecast.methods_used,
        vec!["Linear Regression".to_string(), "Moving Average".to_string()]
    );
    for point in &forecast.predictions {
        assert!(point.components.multi_feature.is_none());
        let expected = point.components.trend * 0.4 + point.components.smoothed_momentum * 0.6;
        assert!((point.moderate - expected).abs() < 1e-12);
    }
}

#[test]
fn test_ensemble_requires_trend_minimum() {
    let bars = make_bars(&random_walk(25, 1));
    assert!(matches!(
        forecast_ensemble(&bars, 5),
        Err(AnalysisError::InsufficientData { required: 30, actual: 25, .. })
    ));
    assert!(matches!(
        forecast_ensemble(&[], 5),
        Err(AnalysisError::InsufficientData { actual: 0, .. })
    ));
}

#[test]
fn test_zero_horizon_rejected() {
    let bars = make_bars(&random_walk(90, 42));
    assert!(matches!(forecast_ensemble(&bars, 0), Err(AnalysisError::InvalidData(_))));
    assert!(matches!(
        predict(&bars, PredictionMethod::Linear, 0),
        Err(AnalysisError::InvalidData(_))
    ));
}

#[test]
fn test_horizon_past_calendar_end_rejected() {
    let bars = make_bars(&random_walk(90, 42));
    for method in [
        PredictionMethod::Linear,
        PredictionMethod::Ma,
        PredictionMethod::Advanced,
        PredictionMethod::Ensemble,
    ] {
        assert!(matches!(
            predict(&bars, method, usize::MAX),
            Err(AnalysisError::InvalidData(_))
        ));
    }

    assert!(matches!(
        forecast_dates(NaiveDate::MAX, 1),
        Err(AnalysisError::InvalidData(_))
    ));
    let near_end = NaiveDate::MAX - Duration::days(2);
    assert_eq!(forecast_dates(near_end, 2).unwrap().last(), Some(&NaiveDate::MAX));
}

// ── Method dispatch ─────────────────────────────────────────────────

#[test]
fn test_predict_dispatch() {
    let bars = make_bars(&random_walk(90, 11));

    match predict(&bars, PredictionMethod::Ma, 3).unwrap() {
        Prediction::Single(f) => assert_eq!(f.method, "Moving Average"),
        other => panic!("unexpected {:?}", other),
    }
    match predict(&bars, PredictionMethod::Ensemble, 3).unwrap() {
        Prediction::Ensemble(f) => assert_eq!(f.predictions.len(), 3),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_method_parsing() {
    assert_eq!("LINEAR".parse::<PredictionMethod>().unwrap(), PredictionMethod::Linear);
    assert_eq!("ma".parse::<PredictionMethod>().unwrap(), PredictionMethod::Ma);
    assert!("arima".parse::<PredictionMethod>().is_err());
}

#[test]
fn test_single_method_json_is_flat() {
    let bars = make_bars(&random_walk(60, 5));
    let forecast = TrendForecaster.forecast(&bars, 2).unwrap();
    let json = serde_json::to_value(&forecast).unwrap();
    assert_eq!(json["method"], "Linear Regression");
    assert!(json["r_squared"].is_number());
    assert!(json["trend"] == "upward" || json["trend"] == "downward");
    assert_eq!(json["predictions"].as_array().unwrap().len(), 2);
}
