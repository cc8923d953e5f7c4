use analysis_orchestrator::{PredictionReport, MAX_FORECAST_DAYS};
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use price_forecast::PredictionMethod;
use serde::Deserialize;

use crate::{parse_opt, ApiResponse, AppError, AppState};

#[derive(Deserialize, utoipa::IntoParams)]
pub struct PredictQuery {
    /// Days to forecast (1-30)
    #[serde(default = "default_days")]
    pub days: usize,
    /// linear, ma, advanced or ensemble
    #[serde(default)]
    pub method: Option<String>,
}

fn default_days() -> usize {
    7
}

pub fn predict_routes() -> Router<AppState> {
    Router::new().route("/api/predict/:symbol", get(predict_price))
}

#[utoipa::path(
    get,
    path = "/api/predict/{symbol}",
    params(("symbol" = String, Path, description = "Stock ticker symbol"), PredictQuery),
    responses(
        (status = 200, description = "Price forecast"),
        (status = 400, description = "Bad horizon or method, or too little history")
    ),
    tag = "Prediction"
)]
pub(crate) async fn predict_price(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<PredictQuery>,
) -> Result<Json<ApiResponse<PredictionReport>>, AppError> {
    if query.days == 0 || query.days > MAX_FORECAST_DAYS {
        return Err(AppError::bad_request(format!(
            "days must be between 1 and {}",
            MAX_FORECAST_DAYS
        )));
    }
    let method = parse_opt(query.method.as_deref())?.unwrap_or(PredictionMethod::Ensemble);

    let report = state.orchestrator.predict(&symbol, query.days, method).await?;
    Ok(Json(ApiResponse::success(report)))
}
