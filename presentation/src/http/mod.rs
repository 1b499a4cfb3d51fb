//! HTTP façade over the federated tool catalog
//!
//! | Route | Response |
//! |-------|----------|
//! | `GET /health` | `{"status": "ok"}` |
//! | `GET /api/tools` | `{"tools": [descriptor, ...]}` |
//! | `POST /api/tool/:name` | the call result, or `{"error": ...}` |
//!
//! The body of a tool call must be a JSON object (an empty body is `{}`).
//! Unknown tools answer 404; any other catalog failure answers 500. A tool
//! that ran and reported an error is still a 200 with `isError: true`.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use toolbridge_application::{CatalogError, ToolCatalogPort};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::chat::parse_json_arguments;
use crate::config::HttpConfig;

#[derive(Clone)]
struct AppState {
    catalog: Arc<dyn ToolCatalogPort>,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_tools(State(state): State<AppState>) -> Response {
    match state.catalog.list_tools().await {
        Ok(tools) => Json(json!({ "tools": tools })).into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn call_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Response {
    let raw = String::from_utf8_lossy(&body);
    let arguments = match parse_json_arguments(&raw) {
        Ok(arguments) => arguments,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    match state.catalog.call_tool(&name, arguments).await {
        Ok(result) => Json(result).into_response(),
        Err(CatalogError::ToolNotFound(_)) => {
            error_response(StatusCode::NOT_FOUND, "Tool not found")
        }
        Err(e) => {
            warn!(tool = %name, error = %e, "Tool call failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

fn cors(allowed_origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);
    match HeaderValue::from_str(allowed_origin) {
        Ok(origin) => layer.allow_origin(origin),
        Err(e) => {
            warn!(origin = allowed_origin, error = %e, "Invalid CORS origin; cross-origin requests disabled");
            layer
        }
    }
}

/// Build the router for a catalog
pub fn router(catalog: Arc<dyn ToolCatalogPort>, allowed_origin: &str) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/tools", get(list_tools))
        .route("/api/tool/:name", post(call_tool))
        .layer(cors(allowed_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { catalog })
}

/// Serve the API until `shutdown` resolves
pub async fn serve(
    catalog: Arc<dyn ToolCatalogPort>,
    config: &HttpConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(&config.bind_address).await?;
    info!(address = %config.bind_address, "HTTP API listening");
    println!("Listening on http://{}", config.bind_address);

    axum::serve(listener, router(catalog, &config.allowed_origin))
        .with_graceful_shutdown(shutdown)
        .await
}
