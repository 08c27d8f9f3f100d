//! Capabilities that delegate to the Azure ML workspace bridge.
//!
//! These follow the two-tier failure convention: a bridge fault is caught
//! inside the handler and folded into a domain payload (`status: error`),
//! which the dispatcher then reports as a transport-level `success`. A
//! transport-level `error` from these tools would mean the capability
//! itself could not run at all.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::bridge::{JobSummary, WorkspaceFactory};
use crate::error::BridgeError;
use crate::registry::{Capability, ParamKind, ParamSpec};

use super::{optional_str, require_str};

/// Pipeline definition used when the caller does not name one.
pub const DEFAULT_PIPELINE_JOB_YAML: &str = "aml/jobs/pipeline.yml";
/// Experiment used when the caller does not name one.
pub const DEFAULT_EXPERIMENT_NAME: &str = "mcp-integration-demo";

// ---------------------------------------------------------------------------
// run_aml_pipeline
// ---------------------------------------------------------------------------

pub fn run_aml_pipeline_capability(factory: WorkspaceFactory) -> Capability {
    Capability::new(
        "run_aml_pipeline",
        "Trigger an Azure ML pipeline job",
        Arc::new(move |params| {
            let factory = Arc::clone(&factory);
            Box::pin(async move { Ok(run_aml_pipeline(&factory, &params).await) })
        }),
    )
    .with_param(ParamSpec::optional("pipeline_job_yaml", ParamKind::String))
    .with_param(ParamSpec::optional("payload", ParamKind::Mapping))
    .with_param(ParamSpec::optional("experiment_name", ParamKind::String))
}

async fn run_aml_pipeline(factory: &WorkspaceFactory, params: &HashMap<String, Value>) -> Value {
    let definition = optional_str(params, "pipeline_job_yaml")
        .unwrap_or_else(|| DEFAULT_PIPELINE_JOB_YAML.to_string());
    let experiment = optional_str(params, "experiment_name")
        .unwrap_or_else(|| DEFAULT_EXPERIMENT_NAME.to_string());

    // `payload` stays in the public contract for compatibility but is not
    // forwarded: the reference pipeline definition takes no inputs.
    if let Some(payload) = params.get("payload") {
        tracing::info!(payload = %payload, "run_aml_pipeline payload accepted (not forwarded)");
    }

    tracing::info!(definition = %definition, experiment = %experiment, "run_aml_pipeline called");

    let submitted = match factory() {
        Ok(workspace) => workspace.submit_pipeline_job(&definition, &experiment).await,
        Err(err) => Err(err),
    };

    match submitted {
        Ok(job) => {
            tracing::info!(job = %job.job_name, "pipeline job submitted");
            let message = format!("Pipeline job {} submitted successfully", job.job_name);
            json!({
                "status": "submitted",
                "job": job,
                "message": message,
            })
        }
        Err(err @ BridgeError::MissingEnv { .. }) => {
            tracing::error!(error = %err, "pipeline submission failed");
            json!({
                "status": "error",
                "error": err.to_string(),
                "message": "Azure ML configuration is incomplete",
            })
        }
        Err(err) => {
            tracing::error!(error = %err, "pipeline submission failed");
            json!({
                "status": "error",
                "error": err.to_string(),
                "message": "Pipeline submission failed",
            })
        }
    }
}

// ---------------------------------------------------------------------------
// list_aml_experiments
// ---------------------------------------------------------------------------

pub fn list_aml_experiments_capability(factory: WorkspaceFactory) -> Capability {
    Capability::new(
        "list_aml_experiments",
        "List all experiments in the Azure ML workspace",
        Arc::new(move |_params| {
            let factory = Arc::clone(&factory);
            Box::pin(async move { Ok(list_aml_experiments(&factory).await) })
        }),
    )
}

async fn list_aml_experiments(factory: &WorkspaceFactory) -> Value {
    tracing::info!("list_aml_experiments called");

    let workspace = match factory() {
        Ok(workspace) => workspace,
        Err(err) => {
            tracing::error!(error = %err, "failed to list experiments");
            return json!({
                "status": "error",
                "error": err.to_string(),
                "experiments": [],
                "count": 0,
            });
        }
    };

    // A workspace with no jobs yet answers with an empty listing rather
    // than a failure, so a listing fault degrades to "no experiments".
    let experiments = match workspace.list_jobs().await {
        Ok(jobs) => experiments_from_jobs(&jobs),
        Err(err) => {
            tracing::warn!(error = %err, "job listing failed, reporting no experiments");
            Vec::new()
        }
    };

    json!({
        "status": "success",
        "count": experiments.len(),
        "experiments": experiments,
    })
}

/// Experiments are derived from jobs: unique experiment names, sorted.
fn experiments_from_jobs(jobs: &[JobSummary]) -> Vec<Value> {
    let mut names: Vec<&str> = jobs
        .iter()
        .filter_map(|j| j.experiment_name.as_deref())
        .collect();
    names.sort_unstable();
    names.dedup();
    names
        .into_iter()
        .map(|name| json!({"name": name, "description": null}))
        .collect()
}

// ---------------------------------------------------------------------------
// get_aml_job_status
// ---------------------------------------------------------------------------

pub fn get_aml_job_status_capability(factory: WorkspaceFactory) -> Capability {
    Capability::new(
        "get_aml_job_status",
        "Get the status of an Azure ML job",
        Arc::new(move |params| {
            let factory = Arc::clone(&factory);
            Box::pin(async move {
                let job_name = require_str(&params, "job_name")?;
                Ok(get_aml_job_status(&factory, &job_name).await)
            })
        }),
    )
    .with_param(ParamSpec::required("job_name", ParamKind::String))
}

async fn get_aml_job_status(factory: &WorkspaceFactory, job_name: &str) -> Value {
    tracing::info!(job = %job_name, "get_aml_job_status called");

    let details = match factory() {
        Ok(workspace) => workspace.get_job(job_name).await,
        Err(err) => Err(err),
    };

    match details {
        Ok(details) => json!(details),
        Err(err) => {
            tracing::error!(job = %job_name, error = %err, "failed to get job status");
            json!({
                "status": "error",
                "error": err.to_string(),
                "job_name": job_name,
                "message": format!("Could not retrieve status for job {job_name}"),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// list_aml_compute_targets
// ---------------------------------------------------------------------------

pub fn list_aml_compute_targets_capability(factory: WorkspaceFactory) -> Capability {
    Capability::new(
        "list_aml_compute_targets",
        "List all compute targets in the Azure ML workspace",
        Arc::new(move |_params| {
            let factory = Arc::clone(&factory);
            Box::pin(async move { Ok(list_aml_compute_targets(&factory).await) })
        }),
    )
}

async fn list_aml_compute_targets(factory: &WorkspaceFactory) -> Value {
    tracing::info!("list_aml_compute_targets called");

    let computes = match factory() {
        Ok(workspace) => workspace.list_compute_targets().await,
        Err(err) => Err(err),
    };

    match computes {
        Ok(computes) => json!({
            "status": "success",
            "count": computes.len(),
            "compute_targets": computes,
        }),
        Err(err) => {
            tracing::error!(error = %err, "failed to list compute targets");
            json!({
                "status": "error",
                "error": err.to_string(),
                "compute_targets": [],
                "count": 0,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{ComputeTarget, JobDetails, MlWorkspace};
    use crate::dispatch::{Dispatcher, InvocationRequest, InvocationStatus};
    use crate::registry::CapabilityRegistry;
    use async_trait::async_trait;

    struct StubWorkspace;

    #[async_trait]
    impl MlWorkspace for StubWorkspace {
        async fn submit_pipeline_job(
            &self,
            _definition_path: &str,
            experiment_name: &str,
        ) -> Result<JobSummary, BridgeError> {
            Ok(JobSummary {
                job_name: "mcp-job-test".to_string(),
                status: "Starting".to_string(),
                experiment_name: Some(experiment_name.to_string()),
            })
        }

        async fn get_job(&self, job_name: &str) -> Result<JobDetails, BridgeError> {
            Ok(JobDetails {
                job_name: job_name.to_string(),
                status: "Completed".to_string(),
                experiment_name: Some("exp".to_string()),
                created_time: None,
                display_name: None,
                duration: None,
            })
        }

        async fn list_jobs(&self) -> Result<Vec<JobSummary>, BridgeError> {
            Ok(vec![
                JobSummary {
                    job_name: "j1".to_string(),
                    status: "Completed".to_string(),
                    experiment_name: Some("beta".to_string()),
                },
                JobSummary {
                    job_name: "j2".to_string(),
                    status: "Running".to_string(),
                    experiment_name: Some("alpha".to_string()),
                },
                JobSummary {
                    job_name: "j3".to_string(),
                    status: "Running".to_string(),
                    experiment_name: Some("alpha".to_string()),
                },
            ])
        }

        async fn list_compute_targets(&self) -> Result<Vec<ComputeTarget>, BridgeError> {
            Ok(vec![ComputeTarget {
                name: "cpu-cluster".to_string(),
                kind: "AmlCompute".to_string(),
                state: "Succeeded".to_string(),
                size: Some("STANDARD_DS3_V2".to_string()),
            }])
        }
    }

    // Configuration is fine but every backend call fails.
    struct UnreachableWorkspace;

    #[async_trait]
    impl MlWorkspace for UnreachableWorkspace {
        async fn submit_pipeline_job(
            &self,
            _definition_path: &str,
            _experiment_name: &str,
        ) -> Result<JobSummary, BridgeError> {
            Err(self.fault())
        }

        async fn get_job(&self, _job_name: &str) -> Result<JobDetails, BridgeError> {
            Err(self.fault())
        }

        async fn list_jobs(&self) -> Result<Vec<JobSummary>, BridgeError> {
            Err(self.fault())
        }

        async fn list_compute_targets(&self) -> Result<Vec<ComputeTarget>, BridgeError> {
            Err(self.fault())
        }
    }

    impl UnreachableWorkspace {
        fn fault(&self) -> BridgeError {
            BridgeError::Api {
                status: 503,
                message: "workspace unavailable".to_string(),
            }
        }
    }

    fn stub_factory() -> WorkspaceFactory {
        Arc::new(|| Ok(Arc::new(StubWorkspace) as Arc<dyn MlWorkspace>))
    }

    fn unreachable_factory() -> WorkspaceFactory {
        Arc::new(|| Ok(Arc::new(UnreachableWorkspace) as Arc<dyn MlWorkspace>))
    }

    fn failing_factory() -> WorkspaceFactory {
        Arc::new(|| {
            Err(BridgeError::MissingEnv {
                name: "AZURE_SUBSCRIPTION_ID".to_string(),
            })
        })
    }

    fn dispatcher(factory: WorkspaceFactory) -> Dispatcher {
        let registry = super::super::default_registry(factory).unwrap();
        Dispatcher::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn run_aml_pipeline_reports_submission() {
        let result = dispatcher(stub_factory())
            .invoke(InvocationRequest::new("run_aml_pipeline", HashMap::new()))
            .await;

        assert!(result.is_success());
        assert_eq!(result.result["status"], "submitted");
        assert_eq!(result.result["job"]["job_name"], "mcp-job-test");
        assert_eq!(
            result.result["job"]["experiment_name"],
            DEFAULT_EXPERIMENT_NAME
        );
        assert!(result.result["message"]
            .as_str()
            .unwrap()
            .contains("submitted successfully"));
    }

    #[tokio::test]
    async fn run_aml_pipeline_accepts_payload_without_forwarding_it() {
        let mut params = HashMap::new();
        params.insert("payload".to_string(), json!({"message": "hello"}));
        params.insert("experiment_name".to_string(), json!("custom-exp"));

        let result = dispatcher(stub_factory())
            .invoke(InvocationRequest::new("run_aml_pipeline", params))
            .await;

        assert!(result.is_success());
        assert_eq!(result.result["job"]["experiment_name"], "custom-exp");
        assert!(result.result.get("payload").is_none());
    }

    #[tokio::test]
    async fn missing_configuration_is_a_domain_error_inside_transport_success() {
        // Two-tier convention: the handler catches the bridge fault, so the
        // dispatcher reports success with an inner error payload.
        let result = dispatcher(failing_factory())
            .invoke(InvocationRequest::new("run_aml_pipeline", HashMap::new()))
            .await;

        assert_eq!(result.status, InvocationStatus::Success);
        assert_eq!(result.result["status"], "error");
        assert!(result.result["error"]
            .as_str()
            .unwrap()
            .contains("AZURE_SUBSCRIPTION_ID"));
        assert_eq!(
            result.result["message"],
            "Azure ML configuration is incomplete"
        );
    }

    #[tokio::test]
    async fn run_aml_pipeline_reports_backend_fault_as_domain_error() {
        let result = dispatcher(unreachable_factory())
            .invoke(InvocationRequest::new("run_aml_pipeline", HashMap::new()))
            .await;

        assert_eq!(result.status, InvocationStatus::Success);
        assert_eq!(result.result["status"], "error");
        assert!(result.result["error"]
            .as_str()
            .unwrap()
            .contains("workspace unavailable"));
        assert_eq!(result.result["message"], "Pipeline submission failed");
    }

    #[tokio::test]
    async fn list_aml_experiments_derives_unique_sorted_names() {
        let result = dispatcher(stub_factory())
            .invoke(InvocationRequest::new("list_aml_experiments", HashMap::new()))
            .await;

        assert!(result.is_success());
        assert_eq!(result.result["status"], "success");
        assert_eq!(result.result["count"], 2);
        assert_eq!(result.result["experiments"][0]["name"], "alpha");
        assert_eq!(result.result["experiments"][1]["name"], "beta");
    }

    #[tokio::test]
    async fn list_aml_experiments_folds_bridge_failure_into_payload() {
        let result = dispatcher(failing_factory())
            .invoke(InvocationRequest::new("list_aml_experiments", HashMap::new()))
            .await;

        assert!(result.is_success());
        assert_eq!(result.result["status"], "error");
        assert_eq!(result.result["count"], 0);
        assert_eq!(result.result["experiments"], json!([]));
    }

    #[tokio::test]
    async fn list_aml_experiments_swallows_listing_failure_as_empty() {
        // Configuration present but the job listing itself fails: report an
        // empty successful listing, like a workspace with no jobs yet.
        let result = dispatcher(unreachable_factory())
            .invoke(InvocationRequest::new("list_aml_experiments", HashMap::new()))
            .await;

        assert!(result.is_success());
        assert_eq!(result.result["status"], "success");
        assert_eq!(result.result["count"], 0);
        assert_eq!(result.result["experiments"], json!([]));
    }

    #[tokio::test]
    async fn get_aml_job_status_returns_details() {
        let mut params = HashMap::new();
        params.insert("job_name".to_string(), json!("job-42"));

        let result = dispatcher(stub_factory())
            .invoke(InvocationRequest::new("get_aml_job_status", params))
            .await;

        assert!(result.is_success());
        assert_eq!(result.result["job_name"], "job-42");
        assert_eq!(result.result["status"], "Completed");
    }

    #[tokio::test]
    async fn get_aml_job_status_requires_job_name() {
        // The required-parameter check fires at the dispatcher tier, so this
        // is a transport-level error, not a domain payload.
        let result = dispatcher(stub_factory())
            .invoke(InvocationRequest::new("get_aml_job_status", HashMap::new()))
            .await;

        assert_eq!(result.status, InvocationStatus::Error);
        assert!(result.error.unwrap().contains("job_name"));
    }

    #[tokio::test]
    async fn list_aml_compute_targets_reports_targets() {
        let result = dispatcher(stub_factory())
            .invoke(InvocationRequest::new(
                "list_aml_compute_targets",
                HashMap::new(),
            ))
            .await;

        assert!(result.is_success());
        assert_eq!(result.result["count"], 1);
        assert_eq!(result.result["compute_targets"][0]["name"], "cpu-cluster");
        assert_eq!(result.result["compute_targets"][0]["type"], "AmlCompute");
    }
}
