//! Demo agent client: simulated tool selection plus an HTTP client for the
//! bridge server.
//!
//! The "intelligence" here is literal keyword matching against the user
//! message — it exists to demonstrate the agent -> bridge -> Azure ML
//! workflow, not to reason.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use serde_json::json;

use crate::config::DEFAULT_HTTP_TIMEOUT_SECS;
use crate::dispatch::{InvocationRequest, InvocationResult};

/// Default invocation endpoint of a locally running bridge server.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000/mcp/call";
/// Experiment name the demo submits pipeline runs under.
pub const DEMO_EXPERIMENT_NAME: &str = "mcp-foundry-demo";

// ---------------------------------------------------------------------------
// Tool selection
// ---------------------------------------------------------------------------

/// Pick a tool for a user message by keyword matching.
///
/// `get_aml_job_status` is returned without a `job_name` parameter; the
/// caller is expected to collect one (the CLI prompts for it).
pub fn select_tool(message: &str) -> InvocationRequest {
    let lower = message.to_lowercase();

    if lower.contains("pipeline") || lower.contains("run") {
        pipeline_request(message)
    } else if lower.contains("experiment") || lower.contains("list") {
        InvocationRequest::new("list_aml_experiments", HashMap::new())
    } else if lower.contains("status") || lower.contains("job") {
        InvocationRequest::new("get_aml_job_status", HashMap::new())
    } else if lower.contains("greet") || lower.contains("hello") {
        let mut params = HashMap::new();
        params.insert("name".to_string(), json!("Azure Community"));
        InvocationRequest::new("greet", params)
    } else {
        // No keyword matched: default to the pipeline run, like the
        // reference demo.
        pipeline_request(message)
    }
}

fn pipeline_request(message: &str) -> InvocationRequest {
    let mut params = HashMap::new();
    params.insert(
        "pipeline_job_yaml".to_string(),
        json!("aml/jobs/pipeline.yml"),
    );
    params.insert("payload".to_string(), json!({"message": message}));
    params.insert("experiment_name".to_string(), json!(DEMO_EXPERIMENT_NAME));
    InvocationRequest::new("run_aml_pipeline", params)
}

/// Whether a transport result reports a successfully submitted pipeline job
/// (both tiers green).
pub fn pipeline_submitted(result: &InvocationResult) -> bool {
    result.is_success() && result.result["status"] == "submitted"
}

// ---------------------------------------------------------------------------
// McpClient
// ---------------------------------------------------------------------------

/// HTTP client for the bridge server's invocation endpoint.
///
/// Transport failures are folded into an error envelope instead of
/// propagating, so callers always get a well-formed [`InvocationResult`].
pub struct McpClient {
    http: reqwest::Client,
    endpoint: String,
}

impl McpClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    /// Build a client from `MCP_SERVER_URL` and `MCP_HTTP_TIMEOUT_SECS`
    /// (defaults: local server, 60 s).
    pub fn from_env() -> Result<Self, reqwest::Error> {
        let endpoint =
            env::var("MCP_SERVER_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());
        let timeout_secs = env::var("MCP_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
        Self::new(endpoint, Duration::from_secs(timeout_secs))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Invoke a tool over HTTP.
    pub async fn call_tool(&self, request: &InvocationRequest) -> InvocationResult {
        let outcome = async {
            self.http
                .post(&self.endpoint)
                .json(request)
                .send()
                .await?
                .error_for_status()?
                .json::<InvocationResult>()
                .await
        }
        .await;

        match outcome {
            Ok(result) => result,
            Err(err) => {
                tracing::error!(tool = %request.tool_name, error = %err, "failed to call MCP tool");
                InvocationResult::error(format!(
                    "failed to call MCP tool {}: {err}",
                    request.tool_name
                ))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_keywords_select_run_aml_pipeline() {
        let request = select_tool("Hi, use the MCP server to run my ML pipeline");
        assert_eq!(request.tool_name, "run_aml_pipeline");
        assert_eq!(
            request.parameters["payload"]["message"],
            "Hi, use the MCP server to run my ML pipeline"
        );
        assert_eq!(
            request.parameters["experiment_name"],
            json!(DEMO_EXPERIMENT_NAME)
        );
    }

    #[test]
    fn experiment_keywords_select_listing() {
        let request = select_tool("list my experiments please");
        assert_eq!(request.tool_name, "list_aml_experiments");
        assert!(request.parameters.is_empty());
    }

    #[test]
    fn status_keywords_select_job_status_without_job_name() {
        let request = select_tool("what is the status?");
        assert_eq!(request.tool_name, "get_aml_job_status");
        assert!(!request.parameters.contains_key("job_name"));
    }

    #[test]
    fn greeting_keywords_select_greet() {
        let request = select_tool("hello there");
        assert_eq!(request.tool_name, "greet");
        assert_eq!(request.parameters["name"], json!("Azure Community"));
    }

    #[test]
    fn unmatched_message_defaults_to_pipeline() {
        let request = select_tool("do something useful");
        assert_eq!(request.tool_name, "run_aml_pipeline");
    }

    #[tokio::test]
    async fn transport_failure_is_folded_into_error_envelope() {
        // Nothing listens on port 1: the call cannot reach a server, but
        // the caller must still get a well-formed envelope naming the tool.
        let client =
            McpClient::new("http://127.0.0.1:1/mcp/call", Duration::from_millis(200)).unwrap();

        let mut params = HashMap::new();
        params.insert("name".to_string(), json!("Ada"));
        let request = InvocationRequest::new("greet", params);

        let result = client.call_tool(&request).await;
        assert!(!result.is_success());
        assert_eq!(result.result, serde_json::Value::Null);
        assert!(result.error.unwrap().contains("greet"));
    }

    #[test]
    fn from_env_defaults_to_local_server() {
        std::env::remove_var("MCP_SERVER_URL");
        std::env::remove_var("MCP_HTTP_TIMEOUT_SECS");

        let client = McpClient::from_env().unwrap();
        assert_eq!(client.endpoint(), DEFAULT_SERVER_URL);
    }

    #[test]
    fn pipeline_submitted_requires_both_tiers() {
        let submitted = InvocationResult::success(json!({"status": "submitted"}));
        assert!(pipeline_submitted(&submitted));

        let inner_error = InvocationResult::success(json!({"status": "error"}));
        assert!(!pipeline_submitted(&inner_error));

        let transport_error = InvocationResult::error("unknown capability: x");
        assert!(!pipeline_submitted(&transport_error));
    }
}
