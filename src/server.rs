//! HTTP server: REST endpoints, tool endpoints, and the MCP endpoint.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Liveness text |
//! | `GET`  | `/health` | Status, version, scenario cache state |
//! | `GET`  | `/scenarios` | Cached scenario list |
//! | `GET`  | `/scenarios/{id}` | Scenario page content (text) |
//! | `GET`  | `/cards?type=` | Live card list |
//! | `GET`  | `/search?type=&name=&...` | Search scenarios, cards, investigators |
//! | `GET`  | `/tools/list` | Registered tools with schemas |
//! | `POST` | `/tools/{name}` | Call a tool |
//! | `*`    | `/mcp` | MCP Streamable HTTP transport |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "not found: scenario 'x'" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `upstream_error` (502),
//! `tool_error` (500), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::cache::CacheStatus;
use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::ArkhamError;
use crate::mcp::McpBridge;
use crate::models::{CardRecord, ScenarioRecord, SearchHit};
use crate::search::SearchRequest;
use crate::traits::{validate_params, ToolContext, ToolInfo, ToolRegistry};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    catalog: Arc<Catalog>,
    tools: Arc<ToolRegistry>,
}

/// Starts the HTTP server on `[server].bind` with the built-in tools.
///
/// Runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let catalog = Arc::new(Catalog::from_config(config)?);
    let tools = Arc::new(ToolRegistry::with_builtins());
    serve(&config.server.bind, catalog, tools).await
}

/// Bind `addr` and serve [`build_router`] until shutdown.
pub async fn serve(
    addr: &str,
    catalog: Arc<Catalog>,
    tools: Arc<ToolRegistry>,
) -> anyhow::Result<()> {
    let app = build_router(catalog, tools);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "server listening (MCP at /mcp)");
    axum::serve(listener, app).await?;

    Ok(())
}

/// All routes, including the MCP endpoint at `/mcp`.
pub fn build_router(catalog: Arc<Catalog>, tools: Arc<ToolRegistry>) -> Router {
    let bridge = McpBridge::new(catalog.clone(), tools.clone());
    let mcp_service = StreamableHttpService::new(
        move || Ok(bridge.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/scenarios", get(handle_list_scenarios))
        .route("/scenarios/{id}", get(handle_scenario_detail))
        .route("/cards", get(handle_list_cards))
        .route("/search", get(handle_search))
        .route("/tools/list", get(handle_list_tools))
        .route("/tools/{name}", post(handle_tool_call))
        .nest_service("/mcp", mcp_service)
        .layer(cors)
        .with_state(AppState { catalog, tools })
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    fn from_arkham(err: &ArkhamError, message: String) -> Self {
        match err {
            ArkhamError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "not_found", message),
            ArkhamError::InvalidUri(_) | ArkhamError::Validation(_) => {
                Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
            }
            ArkhamError::InvalidResponse(_) => {
                Self::new(StatusCode::BAD_GATEWAY, "upstream_error", message)
            }
            e if e.is_network_failure() => {
                Self::new(StatusCode::BAD_GATEWAY, "upstream_error", message)
            }
            _ => Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message),
        }
    }
}

impl From<ArkhamError> for AppError {
    fn from(err: ArkhamError) -> Self {
        let message = err.to_string();
        Self::from_arkham(&err, message)
    }
}

/// Maps a tool failure to a status code. Typed catalog errors keep their
/// meaning; untyped ones are classified by message.
fn classify_tool_error(tool_name: &str, err: anyhow::Error) -> AppError {
    let message = format!("{}: {:#}", tool_name, err);

    if let Some(arkham) = err.downcast_ref::<ArkhamError>() {
        return AppError::from_arkham(arkham, message);
    }

    let msg = err.to_string();
    if msg.contains("must not be empty") || msg.contains("invalid") || msg.contains("missing") {
        AppError::new(StatusCode::BAD_REQUEST, "bad_request", message)
    } else {
        AppError::new(StatusCode::INTERNAL_SERVER_ERROR, "tool_error", message)
    }
}

// ============ GET / and /health ============

async fn handle_root() -> &'static str {
    "Arkham Horror MCP server is running."
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    scenario_cache: CacheStatus,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        scenario_cache: state.catalog.cache_status().await,
    })
}

// ============ Scenarios and cards ============

async fn handle_list_scenarios(State(state): State<AppState>) -> Json<Vec<ScenarioRecord>> {
    let scenarios = state.catalog.list_scenarios().await;
    Json(scenarios.as_ref().clone())
}

async fn handle_scenario_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<String, AppError> {
    Ok(state.catalog.get_scenario_detail(&id).await?)
}

#[derive(Debug, Deserialize)]
struct CardsQuery {
    #[serde(rename = "type")]
    card_type: Option<String>,
}

async fn handle_list_cards(
    State(state): State<AppState>,
    Query(query): Query<CardsQuery>,
) -> Json<Vec<CardRecord>> {
    Json(state.catalog.list_cards(query.card_type.as_deref()).await)
}

/// Malformed query strings get the JSON error body, not axum's plain text.
async fn handle_search(
    State(state): State<AppState>,
    query: Result<Query<SearchRequest>, QueryRejection>,
) -> Result<Json<Vec<SearchHit>>, AppError> {
    let Query(request) = query
        .map_err(|e| AppError::new(StatusCode::BAD_REQUEST, "bad_request", e.body_text()))?;
    Ok(Json(state.catalog.search(&request).await))
}

// ============ Tools ============

#[derive(Serialize)]
struct ToolListResponse {
    tools: Vec<ToolInfo>,
}

async fn handle_list_tools(State(state): State<AppState>) -> Json<ToolListResponse> {
    Json(ToolListResponse {
        tools: state.tools.infos(),
    })
}

/// Returns `404` for an unknown tool, `400` for parameter errors, `502`
/// when the upstream failed, and `500` otherwise.
async fn handle_tool_call(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(params): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, AppError> {
    let tool = state.tools.find(&name).ok_or_else(|| {
        AppError::new(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("no tool registered with name: {}", name),
        )
    })?;

    let validated = validate_params(&tool.parameters_schema(), &params)
        .map_err(|e| AppError::new(StatusCode::BAD_REQUEST, "bad_request", e.to_string()))?;

    let ctx = ToolContext::new(state.catalog.clone());
    let result = tool
        .execute(validated, &ctx)
        .await
        .map_err(|e| classify_tool_error(&name, e))?;

    Ok(Json(serde_json::json!({ "result": result })))
}
