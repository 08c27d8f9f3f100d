//! Axum route handlers for the foundry-bridge HTTP server.
//!
//! # Routes
//!
//! - `GET  /`         — HTML info page listing the registered tools
//! - `GET  /health`   — Liveness probe
//! - `GET  /tools`    — Discovery listing (name, description, parameter spec)
//! - `POST /mcp/call` — Invoke a tool; always answers 200 with an
//!   `InvocationResult` envelope (errors live inside the envelope)

use std::sync::Arc;

use axum::{
    extract::State,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use crate::config::ServerConfig;
use crate::dispatch::{Dispatcher, InvocationRequest};
use crate::registry::Capability;

/// Shared server context: the dispatcher (which owns the read-only
/// registry) plus the server configuration. Constructed once at startup and
/// passed explicitly — no ambient globals.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(dispatcher: Arc<Dispatcher>, config: ServerConfig) -> Self {
        Self { dispatcher, config }
    }
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/tools", get(list_tools_handler))
        .route("/mcp/call", post(call_tool_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET / — server info page rendered from the registry.
async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    let tools: String = state
        .dispatcher
        .registry()
        .list()
        .map(|cap| {
            format!(
                "<li><code>{}</code> — {}</li>\n",
                cap.name(),
                cap.description()
            )
        })
        .collect();

    Html(format!(
        "<html>\n<head><title>{name}</title></head>\n<body style=\"font-family: Arial, sans-serif; max-width: 800px; margin: 50px auto; padding: 20px;\">\n\
         <h1>{name}</h1>\n\
         <p>MCP bridge server: Foundry agents &rarr; Azure ML</p>\n\
         <h2>Available Tools:</h2>\n<ul>\n{tools}</ul>\n\
         <h2>API Endpoints:</h2>\n<ul>\n\
         <li><a href=\"/tools\">/tools</a> — list all available tools</li>\n\
         <li><code>POST /mcp/call</code> — call a tool</li>\n\
         </ul>\n\
         <p><strong>Status:</strong> server is running</p>\n\
         </body>\n</html>\n",
        name = state.config.name,
        tools = tools,
    ))
}

/// GET /health — liveness probe.
async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": crate::VERSION,
        "service": "foundry-bridge",
    }))
}

/// GET /tools — discovery listing of every registered capability.
async fn list_tools_handler(State(state): State<AppState>) -> impl IntoResponse {
    let tools: Vec<Value> = state
        .dispatcher
        .registry()
        .list()
        .map(|cap| tool_listing(cap))
        .collect();

    Json(json!({ "tools": tools }))
}

fn tool_listing(capability: &Capability) -> Value {
    json!({
        "name": capability.name(),
        "description": capability.description(),
        "parameters": capability.params(),
    })
}

/// POST /mcp/call — invoke a tool with parameters.
///
/// The dispatcher guarantees a well-formed envelope for every request, so
/// this handler is infallible at the HTTP level.
async fn call_tool_handler(
    State(state): State<AppState>,
    Json(request): Json<InvocationRequest>,
) -> impl IntoResponse {
    tracing::info!(tool = %request.tool_name, "tool call received");
    let result = state.dispatcher.invoke(request).await;
    Json(result)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
