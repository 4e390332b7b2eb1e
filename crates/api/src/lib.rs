mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Json, State};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use serde_json::json;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tripgenie_agents::{ConciergeAgent, TurnError};
use tripgenie_core::ChatRequest;
use tripgenie_llm::GeminiClient;
use tripgenie_observability::{AppMetrics, MetricsSnapshot};
use tripgenie_travel::TravelDataClient;

pub use config::{AppConfig, ConfigError, DEFAULT_BIND, DEFAULT_HTTP_TIMEOUT_SECONDS};

pub const ROOT_STATUS: &str = "Travel Chatbot API is running. Go to /docs for the API explorer.";
pub const CHAT_FAILURE_DETAIL: &str = "Failed to get a response from the AI model.";

pub type TripGenieAgent = ConciergeAgent<GeminiClient, TravelDataClient>;

#[derive(Clone)]
pub struct ApiState {
    pub agent: Arc<TripGenieAgent>,
    pub metrics: Arc<AppMetrics>,
    pub allowed_origins: Arc<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    metrics: MetricsSnapshot,
}

/// Constructs the shared upstream clients and the orchestrator that owns them.
pub fn build_agent(config: &AppConfig, metrics: Arc<AppMetrics>) -> Result<TripGenieAgent> {
    let model =
        GeminiClient::new(config.gemini.clone()).context("failed to build completion client")?;
    let travel = TravelDataClient::new(config.travel.clone())
        .context("failed to build travel data client")?;

    Ok(ConciergeAgent::new(
        Arc::new(model),
        Arc::new(travel),
        metrics,
    ))
}

pub fn build_app(config: &AppConfig) -> Result<Router> {
    let metrics = AppMetrics::shared();
    let agent = Arc::new(build_agent(config, metrics.clone())?);

    let state = ApiState {
        agent,
        metrics,
        allowed_origins: Arc::new(config.allowed_origins.clone()),
    };

    Ok(build_router(state))
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .layer(build_cors_layer(&state.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(RequestBodyLimitLayer::new(64 * 1024))
        .with_state(state)
}

async fn root() -> impl IntoResponse {
    Json(json!({ "status": ROOT_STATUS }))
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = HealthResponse {
        status: "ok",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        metrics: state.metrics.snapshot(),
    };
    (StatusCode::OK, Json(payload))
}

async fn chat(State(state): State<ApiState>, Json(request): Json<ChatRequest>) -> Response {
    match state.agent.handle_chat(&request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(error) => chat_failure(error),
    }
}

fn chat_failure(error: TurnError) -> Response {
    tracing::error!(error = %error, "chat request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "detail": CHAT_FAILURE_DETAIL })),
    )
        .into_response()
}

fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();
    let allow_origin = if origins.is_empty() {
        AllowOrigin::mirror_request()
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
