//! Plain-text tables for terminal output.

use std::fmt::Write;

use analysis_core::{AnalystAction, EarningsCalendar, EstimateRange, FinancialStatement, Quote};
use analysis_orchestrator::{
    AnalystChange, AnalystRatings, Comparison, HistoricalData, PredictionReport, ScanResult,
};
use price_forecast::Prediction;
use quant_analysis::QuantReport;

fn money(v: Option<f64>) -> String {
    v.map(|x| format!("${:.2}", x)).unwrap_or_else(|| "N/A".to_string())
}

fn large_number(v: f64) -> String {
    let abs = v.abs();
    if abs >= 1e12 {
        format!("{:.2}T", v / 1e12)
    } else if abs >= 1e9 {
        format!("{:.2}B", v / 1e9)
    } else if abs >= 1e6 {
        format!("{:.2}M", v / 1e6)
    } else {
        format!("{:.0}", v)
    }
}

pub fn quote(q: &Quote) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} {} ===", q.symbol, q.name.as_deref().unwrap_or(""));
    let _ = writeln!(out, "Price:          {}", money(q.current_price));
    if let (Some(change), Some(pct)) = (q.change(), q.change_percent()) {
        let _ = writeln!(out, "Change:         {:+.2} ({:+.2}%)", change, pct);
    }
    let _ = writeln!(out, "Previous close: {}", money(q.previous_close));
    let _ = writeln!(out, "Open:           {}", money(q.open));
    let _ = writeln!(out, "Day range:      {} - {}", money(q.day_low), money(q.day_high));
    if q.fifty_two_week_low.is_some() || q.fifty_two_week_high.is_some() {
        let _ = writeln!(
            out,
            "52w range:      {} - {}",
            money(q.fifty_two_week_low),
            money(q.fifty_two_week_high)
        );
    }
    if let Some(volume) = q.volume {
        let _ = writeln!(out, "Volume:         {}", large_number(volume as f64));
    }
    if let Some(cap) = q.market_cap {
        let _ = writeln!(out, "Market cap:     {}", large_number(cap));
    }
    out
}

pub fn quant(r: &QuantReport) -> String {
    let mut out = String::new();
    let p = &r.analysis_period;
    let _ = writeln!(out, "=== Quantitative Analysis: {} ===", r.symbol);
    let _ = writeln!(
        out,
        "Period: {} to {} ({} trading days)\n",
        p.start_date, p.end_date, p.trading_days
    );

    let ret = &r.returns;
    let _ = writeln!(out, "Returns");
    let _ = writeln!(out, "  Total return:          {:>9.2}%", ret.total_return_pct);
    let _ = writeln!(out, "  Annualized return:     {:>9.2}%", ret.annualized_return_pct);
    let _ = writeln!(out, "  Annualized volatility: {:>9.2}%", ret.annualized_volatility_pct);
    let _ = writeln!(
        out,
        "  Best / worst day:      {:>9.2}% / {:.2}%",
        ret.max_return_pct, ret.min_return_pct
    );

    let risk = &r.risk_metrics;
    let _ = writeln!(out, "\nRisk");
    let _ = writeln!(out, "  Sharpe ratio:          {:>9.2}", risk.sharpe_ratio);
    let _ = writeln!(out, "  Sortino ratio:         {:>9.2}", risk.sortino_ratio);
    if let Some(ir) = risk.information_ratio {
        let _ = writeln!(out, "  Information ratio:     {:>9.2}", ir);
    }
    let _ = writeln!(out, "  VaR 95% (1 day):       {:>9.2}%", risk.var_95.historical_var_pct);
    let _ = writeln!(out, "  VaR 99% (1 day):       {:>9.2}%", risk.var_99.historical_var_pct);
    let _ = writeln!(out, "  CVaR 95%:              {:>9.2}%", risk.cvar_95);
    let _ = writeln!(out, "  Max drawdown:          {:>9.2}%", risk.max_drawdown.max_drawdown_pct);
    let _ = writeln!(
        out,
        "  Current drawdown:      {:>9.2}%",
        risk.max_drawdown.current_drawdown_pct
    );

    match (&r.market_metrics, &r.benchmark_note) {
        (Some(m), _) => {
            let _ = writeln!(out, "\nVersus benchmark ({} overlapping days)", m.overlapping_days);
            let _ = writeln!(out, "  Beta:  {:.2}  {}", m.beta, m.interpretation.beta);
            let _ = writeln!(out, "  Alpha: {:+.2}%  {}", m.alpha_pct, m.interpretation.alpha);
        }
        (None, Some(note)) => {
            let _ = writeln!(out, "\nBenchmark skipped: {}", note);
        }
        (None, None) => {}
    }

    let rec = &r.recommendation;
    let _ = writeln!(
        out,
        "\nRecommendation: {} (confidence {:?}, score {}/10)",
        rec.recommendation, rec.confidence, rec.score
    );
    let _ = writeln!(out, "  {}", rec.action);
    for signal in &rec.positive_signals {
        let _ = writeln!(out, "  + {}", signal);
    }
    for warning in &rec.risk_warnings {
        let _ = writeln!(out, "  ! {}", warning);
    }
    let _ = writeln!(out, "\n{}", rec.disclaimer);
    out
}

pub fn prediction(report: &PredictionReport) -> String {
    let mut out = String::new();
    match &report.prediction {
        Prediction::Single(f) => {
            let _ = writeln!(
                out,
                "=== {} forecast for {} ({} days) ===",
                f.method, report.symbol, report.horizon_days
            );
            let _ = writeln!(out, "Current price: ${:.2}\n", f.current_price);
            let _ = writeln!(out, "{:<12} {:>12} {:>11}", "Date", "Price", "Confidence");
            for p in &f.predictions {
                let _ = writeln!(
                    out,
                    "{:<12} {:>12.2} {:>10.0}%",
                    p.date.to_string(),
                    p.predicted_price,
                    p.confidence * 100.0
                );
            }
        }
        Prediction::Ensemble(f) => {
            let _ = writeln!(
                out,
                "=== Ensemble forecast for {} ({} days) ===",
                report.symbol, report.horizon_days
            );
            let _ = writeln!(
                out,
                "Current price: ${:.2} (as of {})",
                f.current_price, f.last_date
            );
            let _ = writeln!(out, "Methods: {}\n", f.methods_used.join(", "));
            let _ = writeln!(
                out,
                "{:<12} {:>12} {:>12} {:>12} {:>9}",
                "Date", "Conservative", "Moderate", "Optimistic", "Change"
            );
            for p in &f.predictions {
                let _ = writeln!(
                    out,
                    "{:<12} {:>12.2} {:>12.2} {:>12.2} {:>+8.2}%",
                    p.date.to_string(),
                    p.conservative,
                    p.moderate,
                    p.optimistic,
                    p.change_percent_moderate
                );
            }
            let _ = writeln!(out, "\n{}", f.disclaimer);
        }
    }
    out
}

pub fn comparison(c: &Comparison) -> String {
    let mut out = String::new();
    let (a, b) = (&c.first, &c.second);
    let _ = writeln!(out, "=== {} vs {} ({}) ===\n", a.symbol, b.symbol, c.period);
    let _ = writeln!(out, "{:<24} {:>12} {:>12}", "", a.symbol, b.symbol);
    let rows = [
        ("Start price", a.start_price, b.start_price, ""),
        ("End price", a.end_price, b.end_price, ""),
        ("Total return", a.total_return_pct, b.total_return_pct, "%"),
        ("Annualized volatility", a.annualized_volatility_pct, b.annualized_volatility_pct, "%"),
        ("Sharpe ratio", a.sharpe_ratio, b.sharpe_ratio, ""),
        ("Max drawdown", a.max_drawdown_pct, b.max_drawdown_pct, "%"),
    ];
    for (label, x, y, unit) in rows {
        let _ = writeln!(out, "{:<24} {:>11.2}{:1} {:>11.2}{:1}", label, x, unit, y, unit);
    }
    match (&c.relative, &c.relative_note) {
        (Some(m), _) => {
            let _ = writeln!(
                out,
                "\n{} relative to {}: beta {:.2}, alpha {:+.2}%, information ratio {:.2}",
                a.symbol, b.symbol, m.beta, m.alpha_pct, m.information_ratio
            );
        }
        (None, Some(note)) => {
            let _ = writeln!(out, "\nNo relative metrics: {}", note);
        }
        (None, None) => {}
    }
    out
}

pub fn scan(result: &ScanResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "=== Market scan: {} of {} symbols ({}) ===\n",
        result.entries.len(),
        result.total_requested,
        result.period
    );
    let _ = writeln!(
        out,
        "{:<4} {:<8} {:>5} {:<12} {:>10} {:>9} {:>8} {:>9}",
        "#", "Symbol", "Score", "Signal", "Price", "Return", "Sharpe", "MaxDD"
    );
    for (i, e) in result.entries.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:<4} {:<8} {:>5} {:<12} {:>10.2} {:>8.2}% {:>8.2} {:>8.2}%",
            i + 1,
            e.symbol,
            e.score,
            e.recommendation.to_string(),
            e.current_price,
            e.total_return_pct,
            e.sharpe_ratio,
            e.max_drawdown_pct
        );
    }
    if !result.skipped.is_empty() {
        let _ = writeln!(out, "\nSkipped:");
        for s in &result.skipped {
            let _ = writeln!(out, "  {}: {}", s.symbol, s.reason);
        }
    }
    out
}

fn grades(a: &AnalystAction) -> String {
    match (&a.from_grade, &a.to_grade) {
        (Some(from), Some(to)) if !from.is_empty() => format!("{} -> {}", from, to),
        (_, Some(to)) => to.clone(),
        _ => String::new(),
    }
}

pub fn analyst_ratings(r: &AnalystRatings) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} Analyst Ratings ===\n", r.symbol);
    if r.recent_changes.is_empty() {
        let _ = writeln!(out, "No recent upgrades/downgrades data available.");
        return out;
    }
    for a in &r.recent_changes {
        let _ = writeln!(
            out,
            "{:<11} {:<28} {:<10} {}",
            a.date.format("%Y-%m-%d"),
            a.firm,
            a.action,
            grades(a)
        );
    }
    out
}

pub fn history(h: &HistoricalData) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "=== {} {} history ({} bars, {} each) ===\n",
        h.symbol,
        h.period,
        h.bars.len(),
        h.interval
    );
    let _ = writeln!(
        out,
        "{:<17} {:>10} {:>10} {:>10} {:>10} {:>14}",
        "Date", "Open", "High", "Low", "Close", "Volume"
    );
    for b in &h.bars {
        let _ = writeln!(
            out,
            "{:<17} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>14.0}",
            b.timestamp.format("%Y-%m-%d %H:%M"),
            b.open,
            b.high,
            b.low,
            b.close,
            b.volume
        );
    }
    out
}

pub fn analyst_changes(changes: &[AnalystChange], days_back: i64) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "=== Analyst changes (last {} day{}) ===\n",
        days_back,
        if days_back == 1 { "" } else { "s" }
    );
    if changes.is_empty() {
        let _ = writeln!(out, "No analyst changes found.");
        return out;
    }
    for c in changes {
        let a = &c.action;
        let _ = writeln!(
            out,
            "{:<17} {:<7} {:<28} {:<10} {}",
            a.date.format("%Y-%m-%d %H:%M"),
            c.symbol,
            a.firm,
            a.action,
            grades(a)
        );
    }
    out
}

pub fn statement(s: &FinancialStatement) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "=== {} {} statement ({}) ===\n",
        s.symbol,
        s.kind.as_str(),
        if s.quarterly { "quarterly" } else { "annual" }
    );
    let _ = write!(out, "{:<36}", "");
    for period in &s.periods {
        let _ = write!(out, " {:>14}", period.period_end.to_string());
    }
    let _ = writeln!(out);

    let mut items: Vec<&String> = s.periods.iter().flat_map(|p| p.line_items.keys()).collect();
    items.sort();
    items.dedup();
    for item in items {
        let _ = write!(out, "{:<36}", item);
        for period in &s.periods {
            let cell = period
                .line_items
                .get(item)
                .copied()
                .flatten()
                .map(large_number)
                .unwrap_or_else(|| "-".to_string());
            let _ = write!(out, " {:>14}", cell);
        }
        let _ = writeln!(out);
    }
    out
}

fn estimate(label: &str, e: &EstimateRange, out: &mut String) {
    let fmt = |v: Option<f64>| v.map(large_number_or_small).unwrap_or_else(|| "N/A".to_string());
    let _ = writeln!(
        out,
        "{:<18} low {}  avg {}  high {}",
        label,
        fmt(e.low),
        fmt(e.average),
        fmt(e.high)
    );
}

fn large_number_or_small(v: f64) -> String {
    if v.abs() >= 1e6 {
        large_number(v)
    } else {
        format!("{:.2}", v)
    }
}

pub fn earnings(symbol: &str, calendar: Option<&EarningsCalendar>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Next earnings: {} ===", symbol.to_uppercase());
    let Some(cal) = calendar else {
        let _ = writeln!(out, "No upcoming earnings scheduled.");
        return out;
    };
    match cal.next_earnings_date {
        Some(date) => {
            let _ = writeln!(out, "Date:              {}", date);
        }
        None => {
            let _ = writeln!(out, "Date:              not announced");
        }
    }
    estimate("EPS estimate:", &cal.eps_estimate, &mut out);
    estimate("Revenue estimate:", &cal.revenue_estimate, &mut out);
    out
}
