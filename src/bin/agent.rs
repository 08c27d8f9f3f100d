//! Demo agent binary: simulates a Foundry agent calling the bridge server.
//!
//! Reads a user message, picks a tool by keyword matching, calls the bridge
//! server over HTTP, and reports the two-tier outcome. Run with `--direct`
//! for a scripted non-interactive demonstration of the utility and pipeline
//! tools.
//!
//! # Environment Variables
//!
//! - `MCP_SERVER_URL` — invocation endpoint
//!   (default: http://localhost:8000/mcp/call)
//! - `MCP_HTTP_TIMEOUT_SECS` — client timeout (default: 60)

use std::collections::HashMap;
use std::io::{self, BufRead, Write};

use anyhow::Context;
use serde_json::json;

use foundry_bridge::agent::{pipeline_submitted, select_tool, McpClient};
use foundry_bridge::dispatch::InvocationRequest;

const DEFAULT_MESSAGE: &str = "Hi, use the MCP server to run my ML pipeline";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let client = McpClient::from_env().context("failed to build MCP client")?;
    tracing::info!("MCP server: {}", client.endpoint());

    if std::env::args().any(|arg| arg == "--direct") {
        run_direct_demo(&client).await;
        return Ok(());
    }

    println!("Enter your message for the agent (or press Enter for default):");
    println!("  Default: '{DEFAULT_MESSAGE}'");
    let input = read_line()?;
    let message = if input.is_empty() {
        DEFAULT_MESSAGE.to_string()
    } else {
        input
    };
    tracing::info!("User message: \"{message}\"");

    let mut request = select_tool(&message);
    if request.tool_name == "get_aml_job_status" {
        print!("Enter job name: ");
        io::stdout().flush()?;
        let job_name = read_line()?;
        request
            .parameters
            .insert("job_name".to_string(), json!(job_name));
    }

    tracing::info!("Agent calls MCP server -> {}", request.tool_name);
    let result = client.call_tool(&request).await;
    println!("{}", serde_json::to_string_pretty(&result)?);

    if pipeline_submitted(&result) {
        tracing::info!("ML pipeline submitted to Azure ML");
        tracing::info!("Job: {}", result.result["job"]["job_name"]);
        tracing::info!("Status: {}", result.result["job"]["status"]);
    } else if result.is_success() {
        tracing::info!("Tool completed");
    } else {
        tracing::warn!("Tool call failed: {}", result.error.as_deref().unwrap_or(""));
    }

    Ok(())
}

/// Scripted demonstration without any interactive input.
async fn run_direct_demo(client: &McpClient) {
    let mut greet_params = HashMap::new();
    greet_params.insert("name".to_string(), json!("Azure Community"));

    let mut add_params = HashMap::new();
    add_params.insert("a".to_string(), json!(10));
    add_params.insert("b".to_string(), json!(5));

    let calls = vec![
        InvocationRequest::new("greet", greet_params),
        InvocationRequest::new("add_numbers", add_params),
        select_tool("Direct MCP pipeline test"),
    ];

    for request in calls {
        tracing::info!("Calling {} ...", request.tool_name);
        let result = client.call_tool(&request).await;
        match serde_json::to_string_pretty(&result) {
            Ok(rendered) => println!("{rendered}"),
            Err(err) => tracing::error!("failed to render result: {err}"),
        }
    }
}

fn read_line() -> anyhow::Result<String> {
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read stdin")?;
    Ok(line.trim().to_string())
}
