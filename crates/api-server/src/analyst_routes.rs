use analysis_orchestrator::{
    parse_symbol_list, AnalystChange, AnalystRatings, MAX_ANALYST_DAYS_BACK, MAX_ANALYST_LIMIT,
};
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;

use crate::{ApiResponse, AppError, AppState};

#[derive(Deserialize, utoipa::IntoParams)]
pub struct MarketChangesQuery {
    /// Days to look back (1-30)
    #[serde(default = "default_days_back")]
    pub days_back: i64,
    /// Comma-separated symbols; the configured scan list when omitted
    #[serde(default)]
    pub symbols: Option<String>,
}

fn default_days_back() -> i64 {
    1
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct RatingsQuery {
    /// Number of recent actions to return (1-100)
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    20
}

pub fn analyst_routes() -> Router<AppState> {
    Router::new()
        .route("/api/analyst/market", get(market_analyst_changes))
        .route("/api/analyst/:symbol", get(get_analyst_ratings))
}

#[utoipa::path(
    get,
    path = "/api/analyst/{symbol}",
    params(("symbol" = String, Path, description = "Stock ticker symbol"), RatingsQuery),
    responses(
        (status = 200, description = "Most recent upgrades and downgrades, newest first"),
        (status = 400, description = "limit outside 1-100"),
        (status = 404, description = "No data for the symbol")
    ),
    tag = "Analyst Ratings"
)]
pub(crate) async fn get_analyst_ratings(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<RatingsQuery>,
) -> Result<Json<ApiResponse<AnalystRatings>>, AppError> {
    if !(1..=MAX_ANALYST_LIMIT).contains(&query.limit) {
        return Err(AppError::bad_request(format!(
            "limit must be between 1 and {}",
            MAX_ANALYST_LIMIT
        )));
    }
    let ratings = state.orchestrator.analyst_ratings(&symbol, query.limit).await?;
    Ok(Json(ApiResponse::success(ratings)))
}

#[utoipa::path(
    get,
    path = "/api/analyst/market",
    params(MarketChangesQuery),
    responses((status = 200, description = "Recent analyst actions, most recent first")),
    tag = "Analyst Ratings"
)]
pub(crate) async fn market_analyst_changes(
    State(state): State<AppState>,
    Query(query): Query<MarketChangesQuery>,
) -> Result<Json<ApiResponse<Vec<AnalystChange>>>, AppError> {
    if !(1..=MAX_ANALYST_DAYS_BACK).contains(&query.days_back) {
        return Err(AppError::bad_request(format!(
            "days_back must be between 1 and {}",
            MAX_ANALYST_DAYS_BACK
        )));
    }
    let symbols = query
        .symbols
        .as_deref()
        .map(parse_symbol_list)
        .filter(|list| !list.is_empty());

    let changes = state
        .orchestrator
        .market_analyst_changes(symbols.as_deref(), query.days_back, Utc::now())
        .await;
    Ok(Json(ApiResponse::success(changes)))
}
