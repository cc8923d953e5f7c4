//! Quantitative analysis and two-symbol comparison.

use analysis_core::Period;
use analysis_orchestrator::Comparison;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use quant_analysis::QuantReport;
use serde::Deserialize;

use crate::{parse_opt, ApiResponse, AppError, AppState};

#[derive(Deserialize, utoipa::IntoParams)]
pub struct QuantQuery {
    /// Benchmark symbol; empty disables the comparison
    #[serde(default)]
    pub benchmark: Option<String>,
    /// 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y or max
    #[serde(default)]
    pub period: Option<String>,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct PeriodQuery {
    #[serde(default)]
    pub period: Option<String>,
}

pub fn quant_routes() -> Router<AppState> {
    Router::new()
        .route("/api/quant/:symbol", get(get_quant_analysis))
        .route("/api/compare/:symbol1/:symbol2", get(compare_symbols))
}

#[utoipa::path(
    get,
    path = "/api/quant/{symbol}",
    params(("symbol" = String, Path, description = "Stock ticker symbol"), QuantQuery),
    responses(
        (
            status = 200,
            description = "Risk/return metrics, benchmark comparison and recommendation"
        ),
        (status = 400, description = "Too little history or bad query"),
        (status = 404, description = "No data for the symbol")
    ),
    tag = "Quantitative Analysis"
)]
pub(crate) async fn get_quant_analysis(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<QuantQuery>,
) -> Result<Json<ApiResponse<QuantReport>>, AppError> {
    let period: Option<Period> = parse_opt(query.period.as_deref())?;
    let report = state
        .orchestrator
        .quant_analysis(&symbol, query.benchmark.as_deref(), period)
        .await?;
    Ok(Json(ApiResponse::success(report)))
}

#[utoipa::path(
    get,
    path = "/api/compare/{symbol1}/{symbol2}",
    params(
        ("symbol1" = String, Path, description = "Symbol being measured"),
        ("symbol2" = String, Path, description = "Symbol used as the reference"),
        PeriodQuery
    ),
    responses((
        status = 200,
        description = "Headline metrics for both symbols and relative beta/alpha"
    )),
    tag = "Quantitative Analysis"
)]
pub(crate) async fn compare_symbols(
    State(state): State<AppState>,
    Path((symbol1, symbol2)): Path<(String, String)>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<ApiResponse<Comparison>>, AppError> {
    let period: Option<Period> = parse_opt(query.period.as_deref())?;
    let comparison = state.orchestrator.compare(&symbol1, &symbol2, period).await?;
    Ok(Json(ApiResponse::success(comparison)))
}
