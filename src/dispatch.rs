//! Invocation dispatcher: executes one named capability against
//! caller-supplied parameters and normalizes the outcome.
//!
//! The load-bearing invariant lives here: every invocation, regardless of
//! what the handler does internally (including calling a remote backend, or
//! panicking), returns exactly one well-formed [`InvocationResult`]. No raw
//! fault ever crosses the dispatch boundary.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DispatchError;
use crate::registry::CapabilityRegistry;

// ---------------------------------------------------------------------------
// Request / result envelopes
// ---------------------------------------------------------------------------

/// One request to invoke a capability by name.
///
/// Wire field names match the reference transport (`tool_name`,
/// `parameters`). Transient: constructed per call, consumed by the
/// dispatcher, never retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationRequest {
    pub tool_name: String,
    #[serde(default)]
    pub parameters: HashMap<String, Value>,
}

impl InvocationRequest {
    pub fn new(tool_name: impl Into<String>, parameters: HashMap<String, Value>) -> Self {
        Self {
            tool_name: tool_name.into(),
            parameters,
        }
    }
}

/// Transport-level outcome tag of an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvocationStatus {
    Success,
    Error,
}

/// Normalized invocation outcome.
///
/// Exactly one of `result`/`error` is meaningful: on success `result` holds
/// the handler payload and `error` is `None`; on error `result` is JSON
/// `null` and `error` carries the message. The constructors are the only way
/// to build one, which keeps the invariant enforced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationResult {
    pub status: InvocationStatus,
    pub result: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InvocationResult {
    /// Successful invocation carrying the handler's payload.
    pub fn success(result: Value) -> Self {
        Self {
            status: InvocationStatus::Success,
            result,
            error: None,
        }
    }

    /// Failed invocation carrying a human-readable message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: InvocationStatus::Error,
            result: Value::Null,
            error: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == InvocationStatus::Success
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Executes invocations against a read-only capability registry.
///
/// One bounded, synchronous unit of work per invocation from this layer's
/// point of view: no retries, no timeout, no cancellation. Any such policy
/// toward an external backend belongs to that backend's own client.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<CapabilityRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this dispatcher resolves against.
    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Invoke one capability and normalize the outcome.
    ///
    /// Resolution and validation failures short-circuit to an error envelope
    /// without touching the handler. The handler itself runs on a spawned
    /// task so that even a panic is contained and reported as an error
    /// envelope instead of unwinding through the transport.
    pub async fn invoke(&self, request: InvocationRequest) -> InvocationResult {
        let capability = match self.registry.lookup(&request.tool_name) {
            Ok(capability) => capability,
            Err(err) => {
                tracing::warn!(tool = %request.tool_name, "invocation of unregistered capability");
                return InvocationResult::error(err.to_string());
            }
        };

        // Strict required-parameter check. Extra keys pass through
        // unvalidated and no type coercion happens here; kind mismatches
        // surface as handler-level failures.
        for spec in capability.params() {
            if spec.required && !request.parameters.contains_key(&spec.name) {
                let err = DispatchError::MissingParameter {
                    capability: capability.name().to_string(),
                    param: spec.name.clone(),
                };
                tracing::warn!(tool = %request.tool_name, param = %spec.name, "missing required parameter");
                return InvocationResult::error(err.to_string());
            }
        }

        tracing::info!(tool = %request.tool_name, "invoking capability");

        let handler = capability.handler();
        let name = capability.name().to_string();
        let params = request.parameters;
        let outcome = tokio::spawn(async move { handler(params).await }).await;

        match outcome {
            Ok(Ok(value)) => InvocationResult::success(value),
            Ok(Err(err)) => {
                let err = DispatchError::HandlerExecution {
                    capability: name.clone(),
                    message: err.to_string(),
                };
                tracing::error!(tool = %name, error = %err, "handler returned an error");
                InvocationResult::error(err.to_string())
            }
            Err(join_err) => {
                let err = DispatchError::HandlerExecution {
                    capability: name.clone(),
                    message: format!("handler panicked: {join_err}"),
                };
                tracing::error!(tool = %name, error = %err, "handler panicked");
                InvocationResult::error(err.to_string())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
