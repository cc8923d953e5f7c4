use analysis_core::{closes, AnalysisError, Bar};

use crate::{forecast_dates, Forecaster, MethodDetails, MethodForecast, PricePoint, TrendDirection};

/// Bars used for the regression fit.
const TRAINING_WINDOW: usize = 60;

/// Ordinary least squares of close price against the bar index over the
/// trailing 60 bars, extrapolated forward. R² of the fit is the confidence.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrendForecaster;

/// Fitted line y = intercept + slope * x.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Least-squares fit of `y` against x = 0, 1, 2, ...
pub fn fit_against_index(y: &[f64]) -> LinearFit {
    let n = y.len() as f64;
    if y.is_empty() {
        return LinearFit { slope: 0.0, intercept: 0.0, r_squared: 0.0 };
    }

    let x_mean = (n - 1.0) / 2.0;
    let y_mean = y.iter().sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (i, &v) in y.iter().enumerate() {
        let dx = i as f64 - x_mean;
        sxy += dx * (v - y_mean);
        sxx += dx * dx;
    }

    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
    let intercept = y_mean - slope * x_mean;

    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (i, &v) in y.iter().enumerate() {
        let fitted = intercept + slope * i as f64;
        ss_res += (v - fitted).powi(2);
        ss_tot += (v - y_mean).powi(2);
    }

    // A constant target is perfectly explained only by a perfect fit
    let r_squared = if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else if ss_res == 0.0 {
        1.0
    } else {
        0.0
    };

    LinearFit { slope, intercept, r_squared }
}

impl Forecaster for TrendForecaster {
    fn name(&self) -> &'static str {
        "Linear Regression"
    }

    fn min_bars(&self) -> usize {
        30
    }

    fn forecast(&self, bars: &[Bar], horizon_days: usize) -> Result<MethodForecast, AnalysisError> {
        self.check_input(bars, horizon_days)?;

        let window = &bars[bars.len().saturating_sub(TRAINING_WINDOW)..];
        let y = closes(window);
        let fit = fit_against_index(&y);

        let start = y.len();
        let prices: Vec<f64> = (start..start + horizon_days)
            .map(|x| fit.predict(x as f64))
            .collect();

        let current_price = y[y.len() - 1];
        let last_prediction = prices[prices.len() - 1];
        let trend = if last_prediction > current_price {
            TrendDirection::Upward
        } else {
            TrendDirection::Downward
        };

        let last_date = window[window.len() - 1].date();
        let predictions = forecast_dates(last_date, horizon_days)?
            .into_iter()
            .zip(prices)
            .map(|(date, predicted_price)| PricePoint {
                date,
                predicted_price,
                confidence: fit.r_squared,
            })
            .collect();

        Ok(MethodForecast {
            method: self.name().to_string(),
            predictions,
            current_price,
            details: MethodDetails::Trend {
                trend,
                r_squared: fit.r_squared,
            },
        })
    }
}
