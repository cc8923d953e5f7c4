use std::collections::HashMap;
use std::path::{Path, PathBuf};

use analysis_core::{
    AnalysisError, AnalystAction, Bar, EarningsCalendar, FinancialStatement, Interval,
    MarketDataSource, Period, Quote, StatementKind,
};
use async_trait::async_trait;
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Everything stored for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolData {
    pub interval: Interval,
    pub bars: Vec<Bar>,
    #[serde(default)]
    pub quote: Option<Quote>,
    #[serde(default)]
    pub analyst_actions: Vec<AnalystAction>,
    #[serde(default)]
    pub financials: Vec<FinancialStatement>,
    #[serde(default)]
    pub calendar: Option<EarningsCalendar>,
}

impl SymbolData {
    pub fn daily(bars: Vec<Bar>) -> Self {
        Self {
            interval: Interval::Day1,
            bars,
            quote: None,
            analyst_actions: Vec::new(),
            financials: Vec::new(),
            calendar: None,
        }
    }

    /// Bars must be in strictly increasing timestamp order.
    pub fn validate(&self, symbol: &str) -> Result<(), AnalysisError> {
        match self.bars.windows(2).position(|w| w[0].timestamp >= w[1].timestamp) {
            Some(i) => Err(AnalysisError::UpstreamUnavailable(format!(
                "{} bars out of order at {} (after {})",
                symbol,
                self.bars[i + 1].timestamp.format("%Y-%m-%d %H:%M"),
                self.bars[i].timestamp.format("%Y-%m-%d %H:%M")
            ))),
            None => Ok(()),
        }
    }

    fn history(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<Vec<Bar>, AnalysisError> {
        if interval != self.interval {
            return Err(AnalysisError::UpstreamUnavailable(format!(
                "{} is stored at {} bars, {} was requested",
                symbol, self.interval, interval
            )));
        }
        Ok(trim_to_period(&self.bars, period))
    }

    /// Stored quote, or one derived from the last two bars.
    fn quote(&self, symbol: &str) -> Result<Quote, AnalysisError> {
        if let Some(quote) = &self.quote {
            return Ok(quote.clone());
        }

        let last = self
            .bars
            .last()
            .ok_or_else(|| AnalysisError::UpstreamUnavailable(format!("no quote for {}", symbol)))?;
        let previous = self.bars.len().checked_sub(2).map(|i| self.bars[i].close);

        Ok(Quote {
            symbol: symbol.to_string(),
            current_price: Some(last.close),
            previous_close: previous,
            open: Some(last.open),
            day_low: Some(last.low),
            day_high: Some(last.high),
            volume: Some(last.volume.max(0.0) as u64),
            ..Default::default()
        })
    }

    fn statement(
        &self,
        symbol: &str,
        kind: StatementKind,
        quarterly: bool,
    ) -> Result<FinancialStatement, AnalysisError> {
        self.financials
            .iter()
            .find(|s| s.kind == kind && s.quarterly == quarterly)
            .cloned()
            .ok_or_else(|| {
                AnalysisError::UpstreamUnavailable(format!(
                    "no {} {} statement for {}",
                    if quarterly { "quarterly" } else { "annual" },
                    kind.as_str(),
                    symbol
                ))
            })
    }
}

/// Keep the bars within `period` of the last stored bar.
pub fn trim_to_period(bars: &[Bar], period: Period) -> Vec<Bar> {
    let (Some(days), Some(last)) = (period.lookback_days(), bars.last()) else {
        return bars.to_vec();
    };
    let cutoff = last.timestamp - Duration::days(days);
    bars.iter().filter(|b| b.timestamp > cutoff).cloned().collect()
}

/// Data source backed by a map held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    symbols: HashMap<String, SymbolData>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_symbol(mut self, symbol: &str, data: SymbolData) -> Self {
        self.insert(symbol, data);
        self
    }

    pub fn insert(&mut self, symbol: &str, data: SymbolData) {
        self.symbols.insert(symbol.to_uppercase(), data);
    }

    fn get(&self, symbol: &str) -> Result<&SymbolData, AnalysisError> {
        let data = self
            .symbols
            .get(&symbol.to_uppercase())
            .ok_or_else(|| {
                AnalysisError::UpstreamUnavailable(format!("unknown symbol {}", symbol))
            })?;
        data.validate(symbol)?;
        Ok(data)
    }
}

#[async_trait]
impl MarketDataSource for InMemorySource {
    async fn fetch_history(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<Vec<Bar>, AnalysisError> {
        self.get(symbol)?.history(symbol, period, interval)
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, AnalysisError> {
        self.get(symbol)?.quote(&symbol.to_uppercase())
    }

    async fn fetch_analyst_actions(
        &self,
        symbol: &str,
    ) -> Result<Vec<AnalystAction>, AnalysisError> {
        Ok(self.get(symbol)?.analyst_actions.clone())
    }

    async fn fetch_financial_statements(
        &self,
        symbol: &str,
        kind: StatementKind,
        quarterly: bool,
    ) -> Result<FinancialStatement, AnalysisError> {
        self.get(symbol)?.statement(symbol, kind, quarterly)
    }

    async fn fetch_calendar(
        &self,
        symbol: &str,
    ) -> Result<Option<EarningsCalendar>, AnalysisError> {
        Ok(self.get(symbol)?.calendar.clone())
    }
}

/// Data source reading `<dir>/<SYMBOL>.json` files holding a [`SymbolData`].
/// Files are read on every call.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    dir: PathBuf,
}

impl JsonFileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, symbol: &str) -> Result<PathBuf, AnalysisError> {
        let symbol = symbol.trim().to_uppercase();
        let valid = !symbol.is_empty()
            && symbol
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
            && !symbol.contains("..");
        if !valid {
            return Err(AnalysisError::InvalidData(format!("invalid symbol '{}'", symbol)));
        }
        Ok(self.dir.join(format!("{}.json", symbol)))
    }

    async fn load(&self, symbol: &str) -> Result<SymbolData, AnalysisError> {
        let path = self.path_for(symbol)?;
        let raw = tokio::fs::read_to_string(&path).await.map_err(|e| {
            AnalysisError::UpstreamUnavailable(format!("{}: {}", path.display(), e))
        })?;
        let data: SymbolData = serde_json::from_str(&raw).map_err(|e| {
            AnalysisError::UpstreamUnavailable(format!(
                "malformed data file {}: {}",
                path.display(),
                e
            ))
        })?;
        data.validate(&symbol.to_uppercase())?;
        Ok(data)
    }
}

#[async_trait]
impl MarketDataSource for JsonFileSource {
    async fn fetch_history(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<Vec<Bar>, AnalysisError> {
        self.load(symbol).await?.history(symbol, period, interval)
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, AnalysisError> {
        self.load(symbol).await?.quote(&symbol.to_uppercase())
    }

    async fn fetch_analyst_actions(
        &self,
        symbol: &str,
    ) -> Result<Vec<AnalystAction>, AnalysisError> {
        Ok(self.load(symbol).await?.analyst_actions)
    }

    async fn fetch_financial_statements(
        &self,
        symbol: &str,
        kind: StatementKind,
        quarterly: bool,
    ) -> Result<FinancialStatement, AnalysisError> {
        self.load(symbol).await?.statement(symbol, kind, quarterly)
    }

    async fn fetch_calendar(
        &self,
        symbol: &str,
    ) -> Result<Option<EarningsCalendar>, AnalysisError> {
        Ok(self.load(symbol).await?.calendar)
    }
}
