//! Short-horizon price forecasts from simple statistical estimators, and an
//! ensemble that merges them into a conservative/moderate/optimistic band.

pub mod ensemble;
pub mod indicators;
pub mod momentum;
pub mod multi_feature;
pub mod trend;

#[cfg(test)]
mod tests;

use std::fmt;
use std::str::FromStr;

use analysis_core::{AnalysisError, Bar};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

pub use ensemble::{forecast_ensemble, ComponentPrices, EnsemblePoint, Forecast};
pub use momentum::SmoothedMomentumForecaster;
pub use multi_feature::MultiFeatureForecaster;
pub use trend::TrendForecaster;

pub const DISCLAIMER: &str =
    "Predictions are based on historical data and should not be used as financial advice.";

/// One forecast day from a single estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub predicted_price: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Upward,
    Downward,
}

/// Estimator-specific figures reported next to the predictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MethodDetails {
    Trend {
        trend: TrendDirection,
        r_squared: f64,
    },
    SmoothedMomentum {
        sma_5: f64,
        sma_10: f64,
        sma_20: f64,
    },
    MultiFeature {
        features_used: Vec<String>,
    },
}

/// Output of a single estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodForecast {
    pub method: String,
    pub predictions: Vec<PricePoint>,
    pub current_price: f64,
    #[serde(flatten)]
    pub details: MethodDetails,
}

impl MethodForecast {
    pub fn prices(&self) -> impl Iterator<Item = f64> + '_ {
        self.predictions.iter().map(|p| p.predicted_price)
    }
}

/// A price-path estimator.
pub trait Forecaster {
    /// Display name reported in forecasts.
    fn name(&self) -> &'static str;

    /// Minimum number of bars `forecast` accepts.
    fn min_bars(&self) -> usize;

    fn forecast(&self, bars: &[Bar], horizon_days: usize) -> Result<MethodForecast, AnalysisError>;

    /// Shared precondition check for implementations.
    fn check_input(&self, bars: &[Bar], horizon_days: usize) -> Result<(), AnalysisError> {
        check_horizon(horizon_days)?;
        if bars.len() < self.min_bars() {
            return Err(AnalysisError::insufficient(
                format!("{} prediction", self.name()),
                self.min_bars(),
                bars.len(),
            ));
        }
        last_forecast_date(bars[bars.len() - 1].date(), horizon_days)?;
        Ok(())
    }
}

pub(crate) fn check_horizon(horizon_days: usize) -> Result<(), AnalysisError> {
    if horizon_days == 0 {
        return Err(AnalysisError::InvalidData(
            "forecast horizon must be at least 1 day".to_string(),
        ));
    }
    Ok(())
}

/// Date of the final forecast step, if the calendar reaches that far.
pub(crate) fn last_forecast_date(
    last: NaiveDate,
    horizon_days: usize,
) -> Result<NaiveDate, AnalysisError> {
    u64::try_from(horizon_days)
        .ok()
        .and_then(|n| last.checked_add_days(Days::new(n)))
        .ok_or_else(|| {
            AnalysisError::InvalidData(format!(
                "a {} day horizon from {} runs past the last representable date",
                horizon_days, last
            ))
        })
}

/// Forecast dates: one calendar day per step after `last`, weekends included.
pub fn forecast_dates(
    last: NaiveDate,
    horizon_days: usize,
) -> Result<Vec<NaiveDate>, AnalysisError> {
    last_forecast_date(last, horizon_days)?;
    Ok(std::iter::successors(last.succ_opt(), |d| d.succ_opt())
        .take(horizon_days)
        .collect())
}

/// Forecasting method selectable by callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionMethod {
    Linear,
    Ma,
    Advanced,
    Ensemble,
}

impl PredictionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionMethod::Linear => "linear",
            PredictionMethod::Ma => "ma",
            PredictionMethod::Advanced => "advanced",
            PredictionMethod::Ensemble => "ensemble",
        }
    }
}

impl fmt::Display for PredictionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PredictionMethod {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(PredictionMethod::Linear),
            "ma" => Ok(PredictionMethod::Ma),
            "advanced" => Ok(PredictionMethod::Advanced),
            "ensemble" => Ok(PredictionMethod::Ensemble),
            other => Err(AnalysisError::InvalidData(format!(
                "unknown prediction method '{}' (expected linear, ma, advanced or ensemble)",
                other
            ))),
        }
    }
}

/// Result of [`predict`]: either one estimator's path or the ensemble band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Prediction {
    Single(MethodForecast),
    Ensemble(Forecast),
}

/// Run the requested method over `bars`.
pub fn predict(
    bars: &[Bar],
    method: PredictionMethod,
    horizon_days: usize,
) -> Result<Prediction, AnalysisError> {
    match method {
        PredictionMethod::Linear => {
            TrendForecaster.forecast(bars, horizon_days).map(Prediction::Single)
        }
        PredictionMethod::Ma => SmoothedMomentumForecaster
            .forecast(bars, horizon_days)
            .map(Prediction::Single),
        PredictionMethod::Advanced => MultiFeatureForecaster
            .forecast(bars, horizon_days)
            .map(Prediction::Single),
        PredictionMethod::Ensemble => {
            forecast_ensemble(bars, horizon_days).map(Prediction::Ensemble)
        }
    }
}
