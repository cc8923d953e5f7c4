//! Rolling indicators over close prices.
//!
//! Window functions (`sma`, `rolling_std`) return one value per complete
//! window, so the output is `period - 1` shorter than the input. Lagged
//! functions (`roc`, `momentum`) are `period` shorter. `ema` and
//! `macd_line` return one value per input.

/// Simple Moving Average
pub fn sma(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let mut result = Vec::with_capacity(data.len() - period + 1);
    for i in period - 1..data.len() {
        let sum: f64 = data[i + 1 - period..=i].iter().sum();
        result.push(sum / period as f64);
    }
    result
}

/// Last value of the simple moving average, if a full window exists.
pub fn last_sma(data: &[f64], period: usize) -> Option<f64> {
    if period == 0 || data.len() < period {
        return None;
    }
    Some(data[data.len() - period..].iter().sum::<f64>() / period as f64)
}

/// Exponential Moving Average, seeded with the first observation and
/// smoothed recursively with alpha = 2 / (span + 1).
pub fn ema(data: &[f64], span: usize) -> Vec<f64> {
    if span == 0 || data.is_empty() {
        return vec![];
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut result = Vec::with_capacity(data.len());
    result.push(data[0]);

    for i in 1..data.len() {
        let prev = result[i - 1];
        result.push(alpha * data[i] + (1.0 - alpha) * prev);
    }

    result
}

/// MACD line (fast EMA minus slow EMA), one value per input.
pub fn macd_line(data: &[f64], fast_span: usize, slow_span: usize) -> Vec<f64> {
    let fast = ema(data, fast_span);
    let slow = ema(data, slow_span);
    fast.iter().zip(slow.iter()).map(|(f, s)| f - s).collect()
}

/// Rolling sample standard deviation (divisor n - 1).
pub fn rolling_std(data: &[f64], period: usize) -> Vec<f64> {
    if period < 2 || data.len() < period {
        return vec![];
    }

    let mut result = Vec::with_capacity(data.len() - period + 1);
    for i in period - 1..data.len() {
        let window = &data[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        let var = window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (period - 1) as f64;
        result.push(var.sqrt());
    }
    result
}

/// Rate of change over `period` bars, in percent.
/// A zero base price yields a non-finite value.
pub fn roc(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() <= period {
        return vec![];
    }
    (period..data.len())
        .map(|i| (data[i] / data[i - period] - 1.0) * 100.0)
        .collect()
}

/// Price change over `period` bars.
pub fn momentum(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() <= period {
        return vec![];
    }
    (period..data.len()).map(|i| data[i] - data[i - period]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_basic() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = sma(&data, 3);

        assert_eq!(result.len(), 3);
        assert!((result[0] - 2.0).abs() < 0.001); // (1+2+3)/3 = 2
        assert!((result[2] - 4.0).abs() < 0.001); // (3+4+5)/3 = 4
        assert_eq!(last_sma(&data, 3), Some(result[2]));
        assert_eq!(last_sma(&data, 6), None);
    }

    #[test]
    fn test_ema_recursive_seed() {
        let data = vec![22.0, 24.0, 23.0, 25.0, 26.0];
        let result = ema(&data, 3);

        assert_eq!(result.len(), data.len());
        // Seeded with the first price, alpha = 0.5
        assert_eq!(result[0], 22.0);
        assert!((result[1] - 23.0).abs() < 1e-12);
        assert!((result[2] - 23.0).abs() < 1e-12);
        assert!((result[3] - 24.0).abs() < 1e-12);
    }

    #[test]
    fn test_ema_empty_data() {
        assert!(ema(&[], 5).is_empty());
        assert!(ema(&[1.0], 0).is_empty());
    }

    #[test]
    fn test_macd_line_flat_prices() {
        let data = vec![50.0; 40];
        let result = macd_line(&data, 12, 26);
        assert_eq!(result.len(), 40);
        assert!(result.iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn test_macd_line_positive_in_uptrend() {
        let data: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let result = macd_line(&data, 12, 26);
        assert!(result[39] > 0.0);
    }

    #[test]
    fn test_rolling_std() {
        let data = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let result = rolling_std(&data, 8);
        assert_eq!(result.len(), 1);
        assert!((result[0] - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
        assert!(rolling_std(&data, 9).is_empty());
    }

    #[test]
    fn test_roc_and_momentum() {
        let data: Vec<f64> = (0..15).map(|i| 100.0 + 2.0 * i as f64).collect();
        let r = roc(&data, 10);
        let m = momentum(&data, 10);
        assert_eq!(r.len(), 5);
        assert_eq!(m.len(), 5);
        assert!((m[0] - 20.0).abs() < 1e-12);
        assert!((r[0] - 20.0).abs() < 1e-12); // 120 / 100 - 1
        assert!(roc(&data[..10], 10).is_empty());
    }
}
