//! foundry-bridge HTTP server binary.
//!
//! Starts an axum HTTP server exposing the MCP tool endpoints.
//!
//! # Environment Variables
//!
//! - `MCP_SERVER_NAME` / `MCP_SERVER_HOST` / `MCP_SERVER_PORT` — server
//!   identity and bind address (default: 0.0.0.0:8000)
//! - `AZURE_SUBSCRIPTION_ID`, `AZURE_RESOURCE_GROUP`, `AZURE_ML_WORKSPACE`,
//!   `AZURE_ML_TOKEN` — workspace identity for the Azure ML tools (read per
//!   invocation; the utility tools work without them)
//! - `AZURE_ML_HTTP_TIMEOUT_SECS` — outbound backend timeout (default: 60)
//! - `RUST_LOG` — tracing filter (default: "info")
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin server
//! ```

use std::sync::Arc;

use foundry_bridge::bridge::env_workspace_factory;
use foundry_bridge::config::ServerConfig;
use foundry_bridge::dispatch::Dispatcher;
use foundry_bridge::server::{app_router, AppState};
use foundry_bridge::tools::default_registry;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,foundry_bridge=debug".into()),
        )
        .init();

    let config = ServerConfig::from_env();

    // A failed registry population is the one fatal startup condition:
    // abort rather than serve a partial capability set.
    let registry = default_registry(env_workspace_factory())
        .expect("Failed to populate capability registry");
    tracing::info!("Registered tools:");
    for capability in registry.list() {
        tracing::info!("  - {} — {}", capability.name(), capability.description());
    }

    let dispatcher = Arc::new(Dispatcher::new(Arc::new(registry)));
    let state = AppState::new(dispatcher, config.clone());
    let app = app_router(state);

    tracing::info!("{} starting on http://{}", config.name, config.bind_addr());
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /         — server info page");
    tracing::info!("  GET  /health   — liveness probe");
    tracing::info!("  GET  /tools    — list all tools");
    tracing::info!("  POST /mcp/call — execute a tool");

    let listener = tokio::net::TcpListener::bind(&config.bind_addr())
        .await
        .expect("Failed to bind");

    axum::serve(listener, app).await.expect("Server failed");
}
