//! Bridge to the ML-workspace backend.
//!
//! [`MlWorkspace`] is the seam between capability handlers and the external
//! backend: handlers talk to the trait, the Azure ML REST client implements
//! it, and tests substitute stubs. A [`WorkspaceFactory`] (held by the
//! server context) builds a client per invocation so that missing backend
//! configuration surfaces as a handler-tier failure rather than aborting
//! startup.

pub mod azure;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

pub use azure::AzureMlClient;

// ---------------------------------------------------------------------------
// Domain types
// ---------------------------------------------------------------------------

/// Minimal view of a submitted or listed job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSummary {
    pub job_name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experiment_name: Option<String>,
}

/// Detailed view of a single job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDetails {
    pub job_name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experiment_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

/// One compute target in the workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeTarget {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

// ---------------------------------------------------------------------------
// MlWorkspace trait
// ---------------------------------------------------------------------------

/// Operations the bridge exposes to capability handlers.
///
/// Any retry/timeout policy toward the backend lives behind this trait; the
/// dispatcher above imposes none of its own.
#[async_trait]
pub trait MlWorkspace: Send + Sync {
    /// Load a pipeline-job definition and submit it under the given
    /// experiment name.
    async fn submit_pipeline_job(
        &self,
        definition_path: &str,
        experiment_name: &str,
    ) -> Result<JobSummary, BridgeError>;

    /// Fetch details for one job by name.
    async fn get_job(&self, job_name: &str) -> Result<JobDetails, BridgeError>;

    /// List all jobs in the workspace.
    async fn list_jobs(&self) -> Result<Vec<JobSummary>, BridgeError>;

    /// List all compute targets in the workspace.
    async fn list_compute_targets(&self) -> Result<Vec<ComputeTarget>, BridgeError>;
}

/// Builds a workspace client on demand.
pub type WorkspaceFactory =
    Arc<dyn Fn() -> Result<Arc<dyn MlWorkspace>, BridgeError> + Send + Sync>;

/// Factory that constructs an [`AzureMlClient`] from environment
/// configuration on every call, mirroring the reference behavior of
/// building the bridge per invocation.
pub fn env_workspace_factory() -> WorkspaceFactory {
    Arc::new(|| {
        let client = AzureMlClient::from_env()?;
        Ok(Arc::new(client) as Arc<dyn MlWorkspace>)
    })
}
