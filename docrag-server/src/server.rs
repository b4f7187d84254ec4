//! Router and listener for the question-answering API.
//!
//! Handlers only read the [`ServiceContext`]; it is built once before the
//! listener starts and never changes afterwards.

use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{FromRequest, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use docrag::{ServiceContext, ServiceStatus};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::{
    error::ApiError,
    protocol::{ChatRequest, ChatResponse},
};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Loaded pipeline, or the reason it could not be loaded.
    pub context: ServiceContext,
}

impl AppState {
    /// Wrap a service context for the router.
    pub fn new(context: ServiceContext) -> Self {
        Self { context }
    }
}

/// Listen address. Defaults to `0.0.0.0:8000`.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8000 }
    }
}

/// Build the router: `GET /`, `GET /health` and `POST /chat`, with permissive CORS.
pub fn app_router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/chat", post(chat))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Bind `config` and serve `context` until the process stops.
pub async fn run_server(config: ServerConfig, context: ServiceContext) -> anyhow::Result<()> {
    let app = app_router(AppState::new(context));
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| "invalid host/port for docrag server")?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("docrag listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index() -> impl IntoResponse {
    Json(json!({ "status": "docrag API is running" }))
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<ServiceStatus>) {
    let status = state.context.status();
    let code = if status.ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (code, Json(status))
}

/// JSON body extractor whose rejections use the API error shape.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
struct ApiJson<T>(T);

async fn chat(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let exchange = state.context.ask(&request.question, request.session_id.as_deref()).await?;
    Ok(Json(ChatResponse { answer: exchange.answer, source: exchange.retrieved_chunks }))
}
