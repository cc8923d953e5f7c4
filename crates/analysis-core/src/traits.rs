use async_trait::async_trait;

use crate::{
    AnalysisError, AnalystAction, Bar, EarningsCalendar, FinancialStatement, Interval, Period,
    Quote, StatementKind,
};

/// Upstream market data provider.
///
/// The analytics crates never call this themselves; the orchestrator fetches
/// complete series through it and hands immutable slices to the engines.
/// Implementations own retries and timeouts. An empty history is a valid
/// response and is reported by the engines as insufficient data.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn fetch_history(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<Vec<Bar>, AnalysisError>;

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, AnalysisError>;

    async fn fetch_analyst_actions(
        &self,
        symbol: &str,
    ) -> Result<Vec<AnalystAction>, AnalysisError>;

    async fn fetch_financial_statements(
        &self,
        symbol: &str,
        kind: StatementKind,
        quarterly: bool,
    ) -> Result<FinancialStatement, AnalysisError>;

    async fn fetch_calendar(&self, symbol: &str) -> Result<Option<EarningsCalendar>, AnalysisError>;
}
