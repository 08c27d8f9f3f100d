//! Built-in capability set for the bridge server.
//!
//! `utility` holds the pure demonstration tools; `azure_ml` holds the tools
//! that delegate to the workspace bridge. [`default_registry`] assembles the
//! full set; a failure here (duplicate name) is the one fatal startup
//! condition — the server must not come up with a partial registry.

pub mod azure_ml;
pub mod utility;

use std::collections::HashMap;

use serde_json::Value;

use crate::bridge::WorkspaceFactory;
use crate::error::DispatchError;
use crate::registry::{CapabilityRegistry, HandlerError};

/// Build the registry with every built-in capability, in the order the
/// discovery listing advertises them.
pub fn default_registry(factory: WorkspaceFactory) -> Result<CapabilityRegistry, DispatchError> {
    let mut registry = CapabilityRegistry::new();
    registry.register(utility::greet_capability())?;
    registry.register(utility::add_numbers_capability())?;
    registry.register(utility::multiply_numbers_capability())?;
    registry.register(azure_ml::run_aml_pipeline_capability(factory.clone()))?;
    registry.register(azure_ml::list_aml_experiments_capability(factory.clone()))?;
    registry.register(azure_ml::get_aml_job_status_capability(factory.clone()))?;
    registry.register(azure_ml::list_aml_compute_targets_capability(factory))?;
    Ok(registry)
}

// ---------------------------------------------------------------------------
// Parameter extraction helpers
// ---------------------------------------------------------------------------

// The dispatcher only checks presence of required keys; kind mismatches are
// reported from here as handler-level failures.

pub(crate) fn require_str(
    params: &HashMap<String, Value>,
    key: &str,
) -> Result<String, HandlerError> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| format!("parameter '{key}' must be a string").into())
}

pub(crate) fn require_number(
    params: &HashMap<String, Value>,
    key: &str,
) -> Result<f64, HandlerError> {
    params
        .get(key)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| format!("parameter '{key}' must be a number").into())
}

pub(crate) fn optional_str(params: &HashMap<String, Value>, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
