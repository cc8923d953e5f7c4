use analysis_core::{closes, stats, AnalysisError, Bar};
use nalgebra::{DMatrix, DVector};

use crate::indicators::{macd_line, momentum, roc, rolling_std, sma};
use crate::{forecast_dates, Forecaster, MethodDetails, MethodForecast, PricePoint};

pub const FEATURE_NAMES: [&str; 7] = [
    "SMA_5",
    "SMA_10",
    "SMA_20",
    "MACD",
    "ROC",
    "Volatility",
    "Momentum",
];

const FEATURES: usize = FEATURE_NAMES.len();
const TRAINING_ROWS: usize = 50;
const MIN_VALID_ROWS: usize = 30;
const CONFIDENCE: f64 = 0.70;
const NUDGE_UP: f64 = 1.001;
const NUDGE_DOWN: f64 = 0.999;

/// Linear regression of close price on standardized technical features.
///
/// Future days are produced by re-applying the model to the last feature
/// vector, scaled by +0.1% when the previous prediction was above the
/// current close and by -0.1% otherwise. The indicators are not recomputed
/// for the predicted prices, so this is an approximation of a trend and not
/// a recursive forecast.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiFeatureForecaster;

/// Feature vector for one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureRow {
    pub index: usize,
    pub values: [f64; FEATURES],
}

/// Features for every bar where all of them are defined and finite.
pub fn feature_rows(prices: &[f64]) -> Vec<FeatureRow> {
    let sma5 = sma(prices, 5);
    let sma10 = sma(prices, 10);
    let sma20 = sma(prices, 20);
    let macd = macd_line(prices, 12, 26);
    let roc10 = roc(prices, 10);
    let vol10 = rolling_std(prices, 10);
    let mom10 = momentum(prices, 10);

    (19..prices.len())
        .map(|i| FeatureRow {
            index: i,
            values: [
                sma5[i - 4],
                sma10[i - 9],
                sma20[i - 19],
                macd[i],
                roc10[i - 10],
                vol10[i - 9],
                mom10[i - 10],
            ],
        })
        .filter(|row| row.values.iter().all(|v| v.is_finite()))
        .collect()
}

/// Per-column standardization. Constant columns keep a scale of 1.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    pub means: Vec<f64>,
    pub scales: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(rows: &[Vec<f64>]) -> Self {
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut means = Vec::with_capacity(cols);
        let mut scales = Vec::with_capacity(cols);
        for j in 0..cols {
            let column: Vec<f64> = rows.iter().map(|r| r[j]).collect();
            means.push(stats::mean(&column));
            let sd = stats::population_std_dev(&column);
            scales.push(if sd == 0.0 { 1.0 } else { sd });
        }
        Self { means, scales }
    }

    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.means.iter().zip(self.scales.iter()))
            .map(|(x, (m, s))| (x - m) / s)
            .collect()
    }
}

/// Ordinary least squares with an intercept.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearModel {
    /// Fit by centering both sides and solving through the SVD. On a
    /// rank-deficient design this yields the minimum-norm coefficients.
    pub fn fit(x: &[Vec<f64>], y: &[f64]) -> Result<Self, AnalysisError> {
        let n = x.len();
        let cols = x.first().map(|r| r.len()).unwrap_or(0);
        if n == 0 || cols == 0 || y.len() != n {
            return Err(AnalysisError::InvalidData(format!(
                "cannot fit a linear model on {} rows x {} columns with {} targets",
                n,
                cols,
                y.len()
            )));
        }

        let x_means: Vec<f64> = (0..cols)
            .map(|j| x.iter().map(|r| r[j]).sum::<f64>() / n as f64)
            .collect();
        let y_mean = stats::mean(y);

        let design = DMatrix::from_fn(n, cols, |i, j| x[i][j] - x_means[j]);
        let target = DVector::from_iterator(n, y.iter().map(|v| v - y_mean));

        let svd = design.svd(true, true);
        // Singular values below this relative cutoff count as zero
        let eps = svd.singular_values.max() * 1e-10;
        let beta = svd
            .solve(&target, eps)
            .map_err(|e| AnalysisError::InvalidData(format!("least-squares fit failed: {}", e)))?;

        let coefficients: Vec<f64> = beta.iter().copied().collect();
        let intercept = y_mean
            - coefficients
                .iter()
                .zip(x_means.iter())
                .map(|(c, m)| c * m)
                .sum::<f64>();

        Ok(Self { coefficients, intercept })
    }

    pub fn predict(&self, features: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features.iter())
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }
}

impl Forecaster for MultiFeatureForecaster {
    fn name(&self) -> &'static str {
        "Advanced Multi-Feature"
    }

    fn min_bars(&self) -> usize {
        60
    }

    fn forecast(&self, bars: &[Bar], horizon_days: usize) -> Result<MethodForecast, AnalysisError> {
        self.check_input(bars, horizon_days)?;

        let prices = closes(bars);
        let rows = feature_rows(&prices);
        if rows.len() < MIN_VALID_ROWS {
            return Err(AnalysisError::insufficient(
                "feature rows after computing indicators",
                MIN_VALID_ROWS,
                rows.len(),
            ));
        }

        let training = &rows[rows.len().saturating_sub(TRAINING_ROWS)..];
        let x: Vec<Vec<f64>> = training.iter().map(|r| r.values.to_vec()).collect();
        let y: Vec<f64> = training.iter().map(|r| prices[r.index]).collect();

        let scaler = StandardScaler::fit(&x);
        let x_scaled: Vec<Vec<f64>> = x.iter().map(|r| scaler.transform(r)).collect();
        let model = LinearModel::fit(&x_scaled, &y)?;

        let last = training[training.len() - 1];
        let current_price = prices[last.index];
        let mut features = x_scaled[x_scaled.len() - 1].clone();

        let dates = forecast_dates(bars[last.index].date(), horizon_days)?;
        let mut predictions = Vec::with_capacity(dates.len());
        for date in dates {
            let predicted_price = model.predict(&features);
            predictions.push(PricePoint {
                date,
                predicted_price,
                confidence: CONFIDENCE,
            });

            let factor = if predicted_price > current_price { NUDGE_UP } else { NUDGE_DOWN };
            features.iter_mut().for_each(|f| *f *= factor);
        }

        Ok(MethodForecast {
            method: self.name().to_string(),
            predictions,
            current_price,
            details: MethodDetails::MultiFeature {
                features_used: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            },
        })
    }
}
