use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::AnalysisError;

/// OHLCV bar data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    #[serde(default)]
    pub vwap: Option<f64>,
}

impl Bar {
    /// Calendar date of the bar (UTC).
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// Close prices of a series, in bar order.
pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Point-in-time quote. Every value is optional because providers leave
/// fields empty for thinly covered symbols.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub previous_close: Option<f64>,
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub day_low: Option<f64>,
    #[serde(default)]
    pub day_high: Option<f64>,
    #[serde(default)]
    pub fifty_two_week_low: Option<f64>,
    #[serde(default)]
    pub fifty_two_week_high: Option<f64>,
    #[serde(default)]
    pub volume: Option<u64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
}

impl Quote {
    /// Absolute change versus the previous close.
    pub fn change(&self) -> Option<f64> {
        Some(self.current_price? - self.previous_close?)
    }

    /// Percent change versus the previous close.
    pub fn change_percent(&self) -> Option<f64> {
        let prev = self.previous_close?;
        if prev == 0.0 {
            return None;
        }
        Some(self.change()? / prev * 100.0)
    }
}

/// Individual analyst upgrade/downgrade event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalystAction {
    pub date: DateTime<Utc>,
    pub firm: String,
    pub action: String,
    #[serde(default)]
    pub from_grade: Option<String>,
    #[serde(default)]
    pub to_grade: Option<String>,
}

/// Kind of financial statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    Income,
    Balance,
    CashFlow,
}

impl StatementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::Income => "income",
            StatementKind::Balance => "balance",
            StatementKind::CashFlow => "cash_flow",
        }
    }
}

impl FromStr for StatementKind {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "income" => Ok(StatementKind::Income),
            "balance" => Ok(StatementKind::Balance),
            "cashflow" | "cash_flow" | "cash-flow" => Ok(StatementKind::CashFlow),
            other => Err(AnalysisError::InvalidData(format!(
                "unknown statement kind '{}' (expected income, balance or cashflow)",
                other
            ))),
        }
    }
}

/// One reporting period of a financial statement. Line items may be null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementPeriod {
    pub period_end: NaiveDate,
    pub line_items: BTreeMap<String, Option<f64>>,
}

/// Tabular, period-indexed financial statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatement {
    pub symbol: String,
    pub kind: StatementKind,
    pub quarterly: bool,
    pub periods: Vec<StatementPeriod>,
}

/// Low/average/high estimate band
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EstimateRange {
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub average: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
}

/// Upcoming earnings calendar entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EarningsCalendar {
    #[serde(default)]
    pub next_earnings_date: Option<NaiveDate>,
    #[serde(default)]
    pub eps_estimate: EstimateRange,
    #[serde(default)]
    pub revenue_estimate: EstimateRange,
}

/// Lookback period for historical requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1d")]
    Day1,
    #[serde(rename = "5d")]
    Day5,
    #[serde(rename = "1mo")]
    Month1,
    #[serde(rename = "3mo")]
    Month3,
    #[serde(rename = "6mo")]
    Month6,
    #[serde(rename = "1y")]
    Year1,
    #[serde(rename = "2y")]
    Year2,
    #[serde(rename = "5y")]
    Year5,
    #[serde(rename = "max")]
    Max,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day1 => "1d",
            Period::Day5 => "5d",
            Period::Month1 => "1mo",
            Period::Month3 => "3mo",
            Period::Month6 => "6mo",
            Period::Year1 => "1y",
            Period::Year2 => "2y",
            Period::Year5 => "5y",
            Period::Max => "max",
        }
    }

    /// Calendar days covered by the period; `None` for the full history.
    pub fn lookback_days(&self) -> Option<i64> {
        match self {
            Period::Day1 => Some(1),
            Period::Day5 => Some(5),
            Period::Month1 => Some(30),
            Period::Month3 => Some(90),
            Period::Month6 => Some(182),
            Period::Year1 => Some(365),
            Period::Year2 => Some(730),
            Period::Year5 => Some(1825),
            Period::Max => None,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1d" => Ok(Period::Day1),
            "5d" => Ok(Period::Day5),
            "1mo" => Ok(Period::Month1),
            "3mo" => Ok(Period::Month3),
            "6mo" => Ok(Period::Month6),
            "1y" => Ok(Period::Year1),
            "2y" => Ok(Period::Year2),
            "5y" => Ok(Period::Year5),
            "max" => Ok(Period::Max),
            other => Err(AnalysisError::InvalidData(format!("unknown period '{}'", other))),
        }
    }
}

/// Bar interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    Minute1,
    #[serde(rename = "5m")]
    Minute5,
    #[serde(rename = "15m")]
    Minute15,
    #[serde(rename = "30m")]
    Minute30,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "1d")]
    Day1,
    #[serde(rename = "1wk")]
    Week1,
    #[serde(rename = "1mo")]
    Month1,
}

impl Interval {
    pub fn to_minutes(&self) -> i64 {
        match self {
            Interval::Minute1 => 1,
            Interval::Minute5 => 5,
            Interval::Minute15 => 15,
            Interval::Minute30 => 30,
            Interval::Hour1 => 60,
            Interval::Day1 => 1440,
            Interval::Week1 => 10080,
            Interval::Month1 => 43200,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Minute1 => "1m",
            Interval::Minute5 => "5m",
            Interval::Minute15 => "15m",
            Interval::Minute30 => "30m",
            Interval::Hour1 => "1h",
            Interval::Day1 => "1d",
            Interval::Week1 => "1wk",
            Interval::Month1 => "1mo",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1m" => Ok(Interval::Minute1),
            "5m" => Ok(Interval::Minute5),
            "15m" => Ok(Interval::Minute15),
            "30m" => Ok(Interval::Minute30),
            "1h" | "60m" => Ok(Interval::Hour1),
            "1d" => Ok(Interval::Day1),
            "1wk" => Ok(Interval::Week1),
            "1mo" => Ok(Interval::Month1),
            other => Err(AnalysisError::InvalidData(format!("unknown interval '{}'", other))),
        }
    }
}
