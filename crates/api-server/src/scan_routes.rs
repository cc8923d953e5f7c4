//! Market scan over a symbol list.

use analysis_core::Period;
use analysis_orchestrator::{parse_symbol_list, ScanResult};
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::{parse_opt, ApiResponse, AppError, AppState};

/// Symbols accepted in one scan request.
const MAX_SCAN_SYMBOLS: usize = 200;

#[derive(Deserialize, utoipa::IntoParams)]
pub struct ScanQuery {
    /// Comma-separated symbols; the configured list when omitted
    #[serde(default)]
    pub symbols: Option<String>,
    #[serde(default)]
    pub period: Option<String>,
}

pub fn scan_routes() -> Router<AppState> {
    Router::new().route("/api/scan", get(scan_market))
}

#[utoipa::path(
    get,
    path = "/api/scan",
    params(ScanQuery),
    responses((status = 200, description = "Symbols ranked by recommendation score")),
    tag = "Quantitative Analysis"
)]
pub(crate) async fn scan_market(
    State(state): State<AppState>,
    Query(query): Query<ScanQuery>,
) -> Result<Json<ApiResponse<ScanResult>>, AppError> {
    let period: Option<Period> = parse_opt(query.period.as_deref())?;
    let symbols = query
        .symbols
        .as_deref()
        .map(parse_symbol_list)
        .filter(|list| !list.is_empty());

    if let Some(list) = &symbols {
        if list.len() > MAX_SCAN_SYMBOLS {
            return Err(AppError::bad_request(format!(
                "at most {} symbols per scan, got {}",
                MAX_SCAN_SYMBOLS,
                list.len()
            )));
        }
    }

    let result = state.orchestrator.scan(symbols.as_deref(), period).await;
    Ok(Json(ApiResponse::success(result)))
}
