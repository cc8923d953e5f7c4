//! Financial statements and the earnings calendar.

use analysis_core::{EarningsCalendar, FinancialStatement, StatementKind};
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::{ApiResponse, AppError, AppState};

#[derive(Deserialize, utoipa::IntoParams)]
pub struct StatementQuery {
    /// Quarterly instead of annual periods
    #[serde(default)]
    pub quarterly: bool,
}

pub fn financials_routes() -> Router<AppState> {
    Router::new()
        .route("/api/financials/:symbol/next-earnings", get(get_next_earnings))
        .route("/api/financials/:symbol/:kind", get(get_statement))
}

#[utoipa::path(
    get,
    path = "/api/financials/{symbol}/{kind}",
    params(
        ("symbol" = String, Path, description = "Stock ticker symbol"),
        ("kind" = String, Path, description = "income, balance or cashflow"),
        StatementQuery
    ),
    responses(
        (status = 200, description = "Statement line items per period"),
        (status = 404, description = "Statement not available")
    ),
    tag = "Financials"
)]
pub(crate) async fn get_statement(
    State(state): State<AppState>,
    Path((symbol, kind)): Path<(String, String)>,
    Query(query): Query<StatementQuery>,
) -> Result<Json<ApiResponse<FinancialStatement>>, AppError> {
    let kind: StatementKind = kind.parse().map_err(AppError::bad_request)?;
    let statement = state
        .orchestrator
        .financial_statement(&symbol, kind, query.quarterly)
        .await?;
    Ok(Json(ApiResponse::success(statement)))
}

#[utoipa::path(
    get,
    path = "/api/financials/{symbol}/next-earnings",
    params(("symbol" = String, Path, description = "Stock ticker symbol")),
    responses((
        status = 200,
        description = "Next earnings date and estimates; null when none is scheduled"
    )),
    tag = "Financials"
)]
pub(crate) async fn get_next_earnings(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<Option<EarningsCalendar>>>, AppError> {
    let calendar = state.orchestrator.next_earnings(&symbol).await?;
    Ok(Json(ApiResponse::success(calendar)))
}
