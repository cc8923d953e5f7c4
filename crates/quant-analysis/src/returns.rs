use analysis_core::Bar;
use chrono::{DateTime, Utc};

/// Per-bar returns derived from a close-price series.
///
/// The first bar has no predecessor and contributes no return, so a series
/// of `n` bars yields `n - 1` returns. A non-positive previous close yields
/// no return for that step.
#[derive(Debug, Clone, Default)]
pub struct ReturnSeries {
    /// Timestamp of the bar each return ends on.
    pub timestamps: Vec<DateTime<Utc>>,
    /// close[t] / close[t-1] - 1
    pub simple: Vec<f64>,
    /// ln(close[t] / close[t-1])
    pub log: Vec<f64>,
}

impl ReturnSeries {
    pub fn from_bars(bars: &[Bar]) -> Self {
        let mut series = ReturnSeries {
            timestamps: Vec::with_capacity(bars.len().saturating_sub(1)),
            simple: Vec::with_capacity(bars.len().saturating_sub(1)),
            log: Vec::with_capacity(bars.len().saturating_sub(1)),
        };

        for w in bars.windows(2) {
            if w[0].close <= 0.0 {
                continue;
            }
            let ratio = w[1].close / w[0].close;
            series.timestamps.push(w[1].timestamp);
            series.simple.push(ratio - 1.0);
            series.log.push(ratio.ln());
        }

        series
    }

    pub fn len(&self) -> usize {
        self.simple.len()
    }

    pub fn is_empty(&self) -> bool {
        self.simple.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bars(closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar {
                timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                    + chrono::Duration::days(i as i64),
                open: c,
                high: c,
                low: c,
                close: c,
                volume: 1_000.0,
                vwap: None,
            })
            .collect()
    }

    #[test]
    fn test_first_bar_is_dropped() {
        let series = ReturnSeries::from_bars(&bars(&[100.0, 105.0, 103.0, 110.0]));
        assert_eq!(series.len(), 3);
        assert!((series.simple[0] - 0.05).abs() < 1e-12);
        assert!((series.simple[1] - (-2.0 / 105.0)).abs() < 1e-12);
        assert!((series.log[0] - (1.05_f64).ln()).abs() < 1e-12);
        assert_eq!(series.timestamps[0], bars(&[100.0, 105.0])[1].timestamp);
    }

    #[test]
    fn test_single_bar_has_no_returns() {
        let series = ReturnSeries::from_bars(&bars(&[100.0]));
        assert!(series.is_empty());
        assert!(ReturnSeries::from_bars(&[]).is_empty());
    }
}
