use std::collections::BTreeMap;
use std::sync::Arc;

use analysis_core::{
    AnalysisError, AnalystAction, Bar, EarningsCalendar, FinancialStatement, StatementKind,
    StatementPeriod,
};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use price_forecast::{Prediction, PredictionMethod};

use super::*;

fn series(n: usize, drift: f64, phase: f64) -> Vec<Bar> {
    let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            let x = i as f64;
            let close = 100.0 + drift * x + 4.0 * (x / 6.0 + phase).sin() + 1.5 * (x / 2.3).cos();
            Bar {
                timestamp: start + Duration::days(i as i64),
                open: close - 0.3,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1_000_000.0,
                vwap: None,
            }
        })
        .collect()
}

fn orchestrator() -> AnalysisOrchestrator {
    let mut source = InMemorySource::new()
        .with_symbol("AAPL", SymbolData::daily(series(300, 0.15, 0.0)))
        .with_symbol("SPY", SymbolData::daily(series(300, 0.05, 1.0)))
        .with_symbol("WEAK", SymbolData::daily(series(300, -0.2, 2.0)))
        .with_symbol("TINY", SymbolData::daily(series(1, 0.0, 0.0)));

    let now = Utc.with_ymd_and_hms(2024, 10, 1, 12, 0, 0).unwrap();
    let mut aapl = SymbolData::daily(series(300, 0.15, 0.0));
    aapl.analyst_actions = vec![
        analyst_action(now - Duration::days(2), "Morgan Stanley", "up"),
        analyst_action(now - Duration::days(10), "Barclays", "main"),
        analyst_action(now - Duration::days(40), "UBS", "down"),
    ];
    aapl.financials = vec![FinancialStatement {
        symbol: "AAPL".to_string(),
        kind: StatementKind::Income,
        quarterly: false,
        periods: vec![StatementPeriod {
            period_end: NaiveDate::from_ymd_opt(2023, 9, 30).unwrap(),
            line_items: BTreeMap::from([("Total Revenue".to_string(), Some(383_285_000_000.0))]),
        }],
    }];
    aapl.calendar = Some(EarningsCalendar {
        next_earnings_date: NaiveDate::from_ymd_opt(2024, 10, 31),
        ..Default::default()
    });
    source.insert("AAPL", aapl);

    let mut msft = SymbolData::daily(series(300, 0.1, 0.5));
    msft.analyst_actions = vec![analyst_action(now - Duration::days(1), "Jefferies", "init")];
    source.insert("MSFT", msft);

    let config = AnalysisConfig {
        scan_symbols: vec!["AAPL".into(), "SPY".into(), "WEAK".into()],
        ..AnalysisConfig::default()
    };
    AnalysisOrchestrator::new(Arc::new(source), config)
}

fn analyst_action(date: chrono::DateTime<Utc>, firm: &str, action: &str) -> AnalystAction {
    AnalystAction {
        date,
        firm: firm.to_string(),
        action: action.to_string(),
        from_grade: Some("Hold".to_string()),
        to_grade: Some("Buy".to_string()),
    }
}

#[tokio::test]
async fn test_quant_analysis_with_default_benchmark() {
    let orch = orchestrator();
    let report = orch.quant_analysis("aapl", None, None).await.unwrap();

    assert_eq!(report.symbol, "AAPL");
    assert!(report.benchmark_note.is_none());
    let market = report.market_metrics.expect("benchmark metrics");
    assert_eq!(market.overlapping_days, 299);
}

#[tokio::test]
async fn test_quant_analysis_missing_benchmark_is_noted() {
    let orch = orchestrator();
    let report = orch.quant_analysis("AAPL", Some("QQQ"), None).await.unwrap();

    assert!(report.market_metrics.is_none());
    assert!(report.benchmark_note.unwrap().contains("QQQ"));
}

#[tokio::test]
async fn test_quant_analysis_without_benchmark() {
    let orch = orchestrator();
    let report = orch.quant_analysis("AAPL", Some(""), None).await.unwrap();

    assert!(report.market_metrics.is_none());
    assert!(report.benchmark_note.is_none());
}

#[tokio::test]
async fn test_quant_analysis_errors() {
    let orch = orchestrator();
    assert!(matches!(
        orch.quant_analysis("NOPE", None, None).await,
        Err(AnalysisError::UpstreamUnavailable(_))
    ));
    assert!(matches!(
        orch.quant_analysis("TINY", None, None).await,
        Err(AnalysisError::InsufficientData { .. })
    ));
}

#[tokio::test]
async fn test_period_limits_history() {
    let orch = orchestrator();
    let report = orch
        .quant_analysis("AAPL", Some(""), Some(analysis_core::Period::Month1))
        .await
        .unwrap();
    assert_eq!(report.analysis_period.trading_days, 30);
}

#[tokio::test]
async fn test_predict_ensemble_uses_forecast_history() {
    let orch = orchestrator();
    let report = orch
        .predict("aapl", 7, PredictionMethod::Ensemble)
        .await
        .unwrap();

    assert_eq!(report.symbol, "AAPL");
    assert_eq!(report.history_bars, 90);
    match report.prediction {
        Prediction::Ensemble(forecast) => {
            assert_eq!(forecast.predictions.len(), 7);
            assert_eq!(forecast.methods_used.len(), 3);
            for point in &forecast.predictions {
                assert!(point.conservative <= point.moderate + 1e-9);
                assert!(point.moderate <= point.optimistic + 1e-9);
            }
        }
        other => panic!("expected ensemble, got {:?}", other),
    }
}

#[tokio::test]
async fn test_predict_single_method() {
    let orch = orchestrator();
    let report = orch.predict("AAPL", 5, PredictionMethod::Linear).await.unwrap();
    match report.prediction {
        Prediction::Single(forecast) => assert_eq!(forecast.predictions.len(), 5),
        other => panic!("expected single method, got {:?}", other),
    }
}

#[tokio::test]
async fn test_predict_rejects_bad_horizon() {
    let orch = orchestrator();
    for days in [0, MAX_FORECAST_DAYS + 1] {
        assert!(matches!(
            orch.predict("AAPL", days, PredictionMethod::Ensemble).await,
            Err(AnalysisError::InvalidData(_))
        ));
    }
}

#[tokio::test]
async fn test_compare() {
    let orch = orchestrator();
    let comparison = orch.compare("aapl", "spy", None).await.unwrap();

    assert_eq!(comparison.first.symbol, "AAPL");
    assert_eq!(comparison.second.symbol, "SPY");
    assert_eq!(comparison.first.trading_days, 300);
    assert!(comparison.first.total_return_pct > comparison.second.total_return_pct);
    assert!(comparison.relative.is_some());
    assert!(comparison.relative_note.is_none());

    assert!(matches!(
        orch.compare("AAPL", "TINY", None).await,
        Err(AnalysisError::InsufficientData { .. })
    ));
}

#[tokio::test]
async fn test_scan_sorts_and_skips() {
    let orch = orchestrator();
    let symbols: Vec<String> = ["aapl", "WEAK", "TINY", "NOPE", "SPY"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let result = orch.scan(Some(&symbols), None).await;

    assert_eq!(result.total_requested, 5);
    assert_eq!(result.entries.len(), 3);
    assert_eq!(result.skipped.len(), 2);
    assert!(result
        .entries
        .windows(2)
        .all(|w| {
            w[0].score > w[1].score || (w[0].score == w[1].score && w[0].symbol < w[1].symbol)
        }));

    let skipped: Vec<&str> = result.skipped.iter().map(|s| s.symbol.as_str()).collect();
    assert!(skipped.contains(&"TINY"));
    assert!(skipped.contains(&"NOPE"));
}

#[tokio::test]
async fn test_scan_defaults_to_configured_symbols() {
    let orch = orchestrator();
    let result = orch.scan(None, None).await;
    assert_eq!(result.total_requested, 3);
    assert!(result.skipped.is_empty());
}

#[tokio::test]
async fn test_scan_counts_repeated_symbols_once() {
    let orch = orchestrator();
    let symbols: Vec<String> = ["AAPL", "SPY", "aapl", " spy "]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let result = orch.scan(Some(&symbols), None).await;

    assert_eq!(result.total_requested, 2);
    let scanned: Vec<&str> = result.entries.iter().map(|e| e.symbol.as_str()).collect();
    assert_eq!(scanned.len(), 2);
    assert!(scanned.contains(&"AAPL") && scanned.contains(&"SPY"));
}

#[tokio::test]
async fn test_market_analyst_changes() {
    let orch = orchestrator();
    let now = Utc.with_ymd_and_hms(2024, 10, 1, 12, 0, 0).unwrap();
    let symbols = vec!["AAPL".to_string(), "msft".to_string(), "NOPE".to_string()];

    let changes = orch.market_analyst_changes(Some(&symbols), 30, now).await;

    assert_eq!(changes.len(), 3);
    assert_eq!(changes[0].symbol, "MSFT");
    assert_eq!(changes[0].action.firm, "Jefferies");
    assert!(changes.windows(2).all(|w| w[0].action.date >= w[1].action.date));
    assert!(changes.iter().all(|c| c.action.firm != "UBS"));

    let json = serde_json::to_value(&changes[0]).unwrap();
    assert_eq!(json["symbol"], "MSFT");
    assert_eq!(json["firm"], "Jefferies");
}

#[tokio::test]
async fn test_market_analyst_window_is_clamped() {
    let orch = orchestrator();
    let now = Utc.with_ymd_and_hms(2024, 10, 1, 12, 0, 0).unwrap();
    let symbols = vec!["AAPL".to_string()];

    // Wider than the 30-day cap: the 40-day-old action stays out
    let changes = orch.market_analyst_changes(Some(&symbols), i64::MAX, now).await;
    assert_eq!(changes.len(), 2);
    assert!(changes.iter().all(|c| c.action.firm != "UBS"));

    let changes = orch.market_analyst_changes(Some(&symbols), i64::MIN, now).await;
    assert!(changes.is_empty());
    let changes = orch.market_analyst_changes(Some(&symbols), 3, now).await;
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].action.firm, "Morgan Stanley");
}

#[tokio::test]
async fn test_analyst_ratings_newest_first_and_limited() {
    let orch = orchestrator();

    let ratings = orch.analyst_ratings("aapl", 20).await.unwrap();
    assert_eq!(ratings.symbol, "AAPL");
    let firms: Vec<&str> = ratings.recent_changes.iter().map(|a| a.firm.as_str()).collect();
    assert_eq!(firms, ["Morgan Stanley", "Barclays", "UBS"]);

    let ratings = orch.analyst_ratings("AAPL", 2).await.unwrap();
    assert_eq!(ratings.recent_changes.len(), 2);
    let ratings = orch.analyst_ratings("AAPL", 0).await.unwrap();
    assert_eq!(ratings.recent_changes.len(), 1);

    assert!(orch.analyst_ratings("SPY", 20).await.unwrap().recent_changes.is_empty());
    assert!(matches!(
        orch.analyst_ratings("NOPE", 20).await,
        Err(AnalysisError::UpstreamUnavailable(_))
    ));
}

#[tokio::test]
async fn test_history_returns_requested_window() {
    let orch = orchestrator();

    let data = orch.history("aapl", Period::Month1, Interval::Day1).await.unwrap();
    assert_eq!(data.symbol, "AAPL");
    assert_eq!(data.interval, Interval::Day1);
    assert!(!data.bars.is_empty() && data.bars.len() < 300);
    assert!(data.bars.windows(2).all(|w| w[0].timestamp < w[1].timestamp));

    let all = orch.history("AAPL", Period::Max, Interval::Day1).await.unwrap();
    assert_eq!(all.bars.len(), 300);

    assert!(matches!(
        orch.history("NOPE", Period::Month1, Interval::Day1).await,
        Err(AnalysisError::UpstreamUnavailable(_))
    ));
}

#[tokio::test]
async fn test_quote_and_fundamentals_passthrough() {
    let orch = orchestrator();

    let quote = orch.quote("aapl").await.unwrap();
    assert_eq!(quote.symbol, "AAPL");
    assert!(quote.current_price.is_some());

    let income = orch
        .financial_statement("aapl", StatementKind::Income, false)
        .await
        .unwrap();
    assert_eq!(income.periods.len(), 1);
    assert!(orch
        .financial_statement("AAPL", StatementKind::Balance, false)
        .await
        .is_err());

    let calendar = orch.next_earnings("AAPL").await.unwrap().unwrap();
    assert_eq!(calendar.next_earnings_date, NaiveDate::from_ymd_opt(2024, 10, 31));
    assert_eq!(orch.next_earnings("SPY").await.unwrap(), None);
}
