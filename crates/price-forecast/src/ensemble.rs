use analysis_core::{AnalysisError, Bar};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    check_horizon, forecast_dates, Forecaster, MethodForecast, MultiFeatureForecaster,
    SmoothedMomentumForecaster, TrendForecaster, DISCLAIMER,
};

/// Each estimator's price for one forecast day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentPrices {
    pub trend: f64,
    pub smoothed_momentum: f64,
    pub multi_feature: Option<f64>,
}

impl ComponentPrices {
    fn values(&self) -> impl Iterator<Item = f64> + '_ {
        [self.trend, self.smoothed_momentum]
            .into_iter()
            .chain(self.multi_feature)
    }

    /// Lowest estimator price.
    pub fn conservative(&self) -> f64 {
        self.values().fold(f64::INFINITY, f64::min)
    }

    /// Highest estimator price.
    pub fn optimistic(&self) -> f64 {
        self.values().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Weighted blend; smoothed momentum carries the most weight.
    pub fn moderate(&self) -> f64 {
        match self.multi_feature {
            Some(mf) => self.trend * 0.3 + self.smoothed_momentum * 0.4 + mf * 0.3,
            None => self.trend * 0.4 + self.smoothed_momentum * 0.6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsemblePoint {
    pub date: NaiveDate,
    pub conservative: f64,
    pub moderate: f64,
    pub optimistic: f64,
    pub change_percent_moderate: f64,
    pub components: ComponentPrices,
}

/// Ensemble price band over the forecast horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub current_price: f64,
    pub last_date: NaiveDate,
    pub predictions: Vec<EnsemblePoint>,
    pub methods_used: Vec<String>,
    pub disclaimer: String,
}

/// Merge the trend, smoothed-momentum and (when it succeeds) multi-feature
/// estimators into a conservative/moderate/optimistic band.
///
/// The trend and smoothed-momentum estimators are required; their errors
/// are returned as-is. The multi-feature estimator is best effort.
pub fn forecast_ensemble(bars: &[Bar], horizon_days: usize) -> Result<Forecast, AnalysisError> {
    check_horizon(horizon_days)?;

    let trend = TrendForecaster.forecast(bars, horizon_days)?;
    let smoothed = SmoothedMomentumForecaster.forecast(bars, horizon_days)?;
    let multi: Option<MethodForecast> = MultiFeatureForecaster.forecast(bars, horizon_days).ok();

    let last = &bars[bars.len() - 1];
    let current_price = last.close;
    let last_date = last.date();

    let mut methods_used = vec![trend.method.clone(), smoothed.method.clone()];
    if let Some(m) = &multi {
        methods_used.push(m.method.clone());
    }

    let trend_prices: Vec<f64> = trend.prices().collect();
    let smoothed_prices: Vec<f64> = smoothed.prices().collect();
    let multi_prices: Option<Vec<f64>> = multi.as_ref().map(|m| m.prices().collect());

    let predictions = forecast_dates(last_date, horizon_days)?
        .into_iter()
        .enumerate()
        .map(|(i, date)| {
            let components = ComponentPrices {
                trend: trend_prices[i],
                smoothed_momentum: smoothed_prices[i],
                multi_feature: multi_prices.as_ref().and_then(|p| p.get(i).copied()),
            };
            let moderate = components.moderate();
            EnsemblePoint {
                date,
                conservative: components.conservative(),
                moderate,
                optimistic: components.optimistic(),
                change_percent_moderate: (moderate - current_price) / current_price * 100.0,
                components,
            }
        })
        .collect();

    Ok(Forecast {
        current_price,
        last_date,
        predictions,
        methods_used,
        disclaimer: DISCLAIMER.to_string(),
    })
}
