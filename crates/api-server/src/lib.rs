//! REST front-end over [`AnalysisOrchestrator`].
//!
//! Every route returns the `{ success, data, error }` envelope. Analytics
//! failures map onto 4xx statuses; anything else is a 500.

use std::net::SocketAddr;
use std::sync::Arc;

use analysis_core::AnalysisError;
use analysis_orchestrator::{AnalysisConfig, AnalysisOrchestrator, JsonFileSource};
use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod analyst_routes;
mod financials_routes;
mod predict_routes;
mod quant_routes;
mod scan_routes;
mod symbol_routes;


const SERVICE_NAME: &str = "Stock Analytics API";

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<AnalysisOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: AnalysisOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    error: anyhow::Error,
}

impl AppError {
    pub fn with_status(status: StatusCode, error: anyhow::Error) -> Self {
        Self { status, error }
    }

    pub fn bad_request(message: impl std::fmt::Display) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, anyhow::anyhow!("{}", message))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("Request failed: {:#}", self.error);
        } else {
            tracing::debug!("Request rejected ({}): {}", self.status, self.error);
        }
        let body = ApiResponse::<()>::error(self.error.to_string());
        (self.status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, error)
    }
}

impl From<AnalysisError> for AppError {
    fn from(error: AnalysisError) -> Self {
        let status = match &error {
            AnalysisError::InsufficientData { .. } | AnalysisError::InvalidData(_) => {
                StatusCode::BAD_REQUEST
            }
            AnalysisError::NoBenchmarkData | AnalysisError::InsufficientOverlap { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AnalysisError::UpstreamUnavailable(_) => StatusCode::NOT_FOUND,
        };
        Self::with_status(status, error.into())
    }
}

/// Parse an optional query value, mapping parse failures to 400.
pub(crate) fn parse_opt<T>(raw: Option<&str>) -> Result<Option<T>, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.parse().map(Some).map_err(AppError::bad_request),
        None => Ok(None),
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stock Analytics API",
        description = "Quantitative metrics, recommendations and price forecasts"
    ),
    paths(
        root,
        health,
        symbol_routes::get_quote,
        symbol_routes::get_historical,
        quant_routes::get_quant_analysis,
        quant_routes::compare_symbols,
        predict_routes::predict_price,
        scan_routes::scan_market,
        analyst_routes::market_analyst_changes,
        analyst_routes::get_analyst_ratings,
        financials_routes::get_statement,
        financials_routes::get_next_earnings,
    ),
    tags(
        (name = "General"),
        (name = "Stock Data"),
        (name = "Quantitative Analysis"),
        (name = "Prediction"),
        (name = "Analyst Ratings"),
        (name = "Financials"),
    )
)]
pub struct ApiDoc;

#[derive(Serialize)]
struct ServiceInfo {
    name: &'static str,
    version: &'static str,
    endpoints: Vec<&'static str>,
}

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service information")),
    tag = "General"
)]
pub(crate) async fn root() -> Json<ApiResponse<ServiceInfo>> {
    Json(ApiResponse::success(ServiceInfo {
        name: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        endpoints: vec![
            "/health",
            "/api/quote/:symbol",
            "/api/historical/:symbol",
            "/api/quant/:symbol",
            "/api/predict/:symbol",
            "/api/compare/:symbol1/:symbol2",
            "/api/scan",
            "/api/analyst/market",
            "/api/analyst/:symbol",
            "/api/financials/:symbol/:kind",
            "/api/financials/:symbol/next-earnings",
            "/swagger-ui",
        ],
    }))
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up")),
    tag = "General"
)]
pub(crate) async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(symbol_routes::symbol_routes())
        .merge(quant_routes::quant_routes())
        .merge(predict_routes::predict_routes())
        .merge(scan_routes::scan_routes())
        .merge(analyst_routes::analyst_routes())
        .merge(financials_routes::financials_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("api_server=info,analysis_orchestrator=info,tower_http=info")
    });
    let json = std::env::var("LOG_FORMAT").map(|v| v.eq_ignore_ascii_case("json")).unwrap_or(false);
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn bind_address() -> anyhow::Result<SocketAddr> {
    let host = std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("API_PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port)
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid API_HOST/API_PORT '{}:{}': {}", host, port, e))?;
    Ok(addr)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AnalysisConfig::from_env();
    tracing::info!(
        "Market data directory: {} (benchmark {}, risk-free rate {})",
        config.market_data_dir.display(),
        config.benchmark_symbol,
        config.risk_free_rate
    );

    let source = Arc::new(JsonFileSource::new(config.market_data_dir.clone()));
    let state = AppState::new(AnalysisOrchestrator::new(source, config));
    let app = build_router(state);

    let addr = bind_address()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🚀 {} listening on http://{}", SERVICE_NAME, addr);
    tracing::info!("📖 API docs at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
