//! Quote lookup and raw price history.

use analysis_core::{Interval, Period, Quote};
use analysis_orchestrator::HistoricalData;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::{parse_opt, ApiResponse, AppError, AppState};

#[derive(Deserialize, utoipa::IntoParams)]
pub struct HistoryQuery {
    /// 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y or max (default 1mo)
    #[serde(default)]
    pub period: Option<String>,
    /// 1m, 5m, 15m, 30m, 1h, 1d, 1wk or 1mo (default 1d)
    #[serde(default)]
    pub interval: Option<String>,
}

pub fn symbol_routes() -> Router<AppState> {
    Router::new()
        .route("/api/quote/:symbol", get(get_quote))
        .route("/api/historical/:symbol", get(get_historical))
}

#[utoipa::path(
    get,
    path = "/api/quote/{symbol}",
    params(("symbol" = String, Path, description = "Stock ticker symbol")),
    responses(
        (status = 200, description = "Latest quote for the symbol"),
        (status = 404, description = "No data for the symbol")
    ),
    tag = "Stock Data"
)]
pub(crate) async fn get_quote(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<Quote>>, AppError> {
    let quote = state.orchestrator.quote(&symbol).await?;
    Ok(Json(ApiResponse::success(quote)))
}

#[utoipa::path(
    get,
    path = "/api/historical/{symbol}",
    params(("symbol" = String, Path, description = "Stock ticker symbol"), HistoryQuery),
    responses(
        (status = 200, description = "Price bars, oldest first"),
        (status = 400, description = "Unknown period or interval"),
        (status = 404, description = "No data for the symbol at that interval")
    ),
    tag = "Stock Data"
)]
pub(crate) async fn get_historical(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<HistoricalData>>, AppError> {
    let period: Period = parse_opt(query.period.as_deref())?.unwrap_or(Period::Month1);
    let interval: Interval = parse_opt(query.interval.as_deref())?.unwrap_or(Interval::Day1);
    let data = state.orchestrator.history(&symbol, period, interval).await?;
    Ok(Json(ApiResponse::success(data)))
}
