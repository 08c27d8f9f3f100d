//! Azure ML REST client implementing [`MlWorkspace`].
//!
//! Talks to the management-plane job and compute endpoints of one
//! workspace. Authentication is a bearer token supplied through the
//! environment; no credential flow lives here.

use std::fs;
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::config::AzureMlConfig;
use crate::error::BridgeError;

use super::{ComputeTarget, JobDetails, JobSummary, MlWorkspace};

const API_VERSION: &str = "2024-04-01";
const MANAGEMENT_ENDPOINT: &str = "https://management.azure.com";

/// REST client bound to a single Azure ML workspace.
pub struct AzureMlClient {
    http: reqwest::Client,
    config: AzureMlConfig,
    endpoint: String,
}

impl AzureMlClient {
    /// Build a client from an explicit configuration.
    pub fn new(config: AzureMlConfig) -> Result<Self, BridgeError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;
        Ok(Self {
            http,
            config,
            endpoint: MANAGEMENT_ENDPOINT.to_string(),
        })
    }

    /// Build a client from `AZURE_*` environment variables.
    pub fn from_env() -> Result<Self, BridgeError> {
        Self::new(AzureMlConfig::from_env()?)
    }

    /// Builder method overriding the management endpoint (sovereign clouds,
    /// local test servers).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn workspace_url(&self, resource: &str) -> String {
        format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.MachineLearningServices/workspaces/{}/{}?api-version={}",
            self.endpoint,
            self.config.subscription_id,
            self.config.resource_group,
            self.config.workspace_name,
            resource,
            API_VERSION,
        )
    }

    async fn get_json(&self, url: &str) -> Result<Value, BridgeError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.config.access_token)
            .send()
            .await?;
        check_response(response).await
    }

    async fn put_json(&self, url: &str, body: &Value) -> Result<Value, BridgeError> {
        let response = self
            .http
            .put(url)
            .bearer_auth(&self.config.access_token)
            .json(body)
            .send()
            .await?;
        check_response(response).await
    }
}

#[async_trait]
impl MlWorkspace for AzureMlClient {
    async fn submit_pipeline_job(
        &self,
        definition_path: &str,
        experiment_name: &str,
    ) -> Result<JobSummary, BridgeError> {
        let definition = load_pipeline_definition(definition_path)?;
        let body = prepare_job_body(definition, experiment_name);

        let job_name = format!("mcp-job-{}", Uuid::new_v4().simple());
        let url = self.workspace_url(&format!("jobs/{job_name}"));

        tracing::info!(job = %job_name, experiment = %experiment_name, "submitting pipeline job");
        let submitted = self.put_json(&url, &body).await?;
        Ok(job_summary_from(&submitted))
    }

    async fn get_job(&self, job_name: &str) -> Result<JobDetails, BridgeError> {
        let url = self.workspace_url(&format!("jobs/{job_name}"));
        let job = self.get_json(&url).await?;
        Ok(job_details_from(&job))
    }

    async fn list_jobs(&self) -> Result<Vec<JobSummary>, BridgeError> {
        let url = self.workspace_url("jobs");
        let page = self.get_json(&url).await?;
        let jobs = page["value"]
            .as_array()
            .map(|items| items.iter().map(job_summary_from).collect())
            .unwrap_or_default();
        Ok(jobs)
    }

    async fn list_compute_targets(&self) -> Result<Vec<ComputeTarget>, BridgeError> {
        let url = self.workspace_url("computes");
        let page = self.get_json(&url).await?;
        let computes = page["value"]
            .as_array()
            .map(|items| items.iter().map(compute_target_from).collect())
            .unwrap_or_default();
        Ok(computes)
    }
}

// ---------------------------------------------------------------------------
// Request/response plumbing
// ---------------------------------------------------------------------------

async fn check_response(response: reqwest::Response) -> Result<Value, BridgeError> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(BridgeError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response.json().await?)
}

/// Read a pipeline-job YAML definition and convert it to the JSON the REST
/// surface accepts.
pub(crate) fn load_pipeline_definition(path: &str) -> Result<Value, BridgeError> {
    let raw = fs::read_to_string(Path::new(path)).map_err(|e| BridgeError::InvalidDefinition {
        path: path.to_string(),
        message: e.to_string(),
    })?;
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(&raw).map_err(|e| BridgeError::InvalidDefinition {
            path: path.to_string(),
            message: e.to_string(),
        })?;
    serde_json::to_value(yaml).map_err(|e| BridgeError::InvalidDefinition {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// Shape the loaded definition into a job-creation body.
///
/// The experiment name from the definition wins when present; otherwise the
/// caller-supplied one is set, matching the reference submission behavior.
pub(crate) fn prepare_job_body(definition: Value, experiment_name: &str) -> Value {
    let mut properties = match definition {
        Value::Object(map) => map,
        other => {
            let mut map = serde_json::Map::new();
            map.insert("definition".to_string(), other);
            map
        }
    };

    properties
        .entry("jobType".to_string())
        .or_insert_with(|| json!("Pipeline"));
    if !properties.contains_key("experimentName") {
        properties.insert("experimentName".to_string(), json!(experiment_name));
    }

    json!({ "properties": Value::Object(properties) })
}

fn job_summary_from(job: &Value) -> JobSummary {
    JobSummary {
        job_name: str_at(job, &["name"]).unwrap_or_default(),
        status: str_at(job, &["properties", "status"]).unwrap_or_else(|| "Unknown".to_string()),
        experiment_name: str_at(job, &["properties", "experimentName"]),
    }
}

fn job_details_from(job: &Value) -> JobDetails {
    let created_time = str_at(job, &["systemData", "createdAt"])
        .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
        .map(|t| t.with_timezone(&Utc));

    JobDetails {
        job_name: str_at(job, &["name"]).unwrap_or_default(),
        status: str_at(job, &["properties", "status"]).unwrap_or_else(|| "Unknown".to_string()),
        experiment_name: str_at(job, &["properties", "experimentName"]),
        created_time,
        display_name: str_at(job, &["properties", "displayName"]),
        duration: str_at(job, &["properties", "duration"]),
    }
}

fn compute_target_from(compute: &Value) -> ComputeTarget {
    ComputeTarget {
        name: str_at(compute, &["name"]).unwrap_or_default(),
        kind: str_at(compute, &["properties", "computeType"])
            .unwrap_or_else(|| "unknown".to_string()),
        state: str_at(compute, &["properties", "provisioningState"])
            .unwrap_or_else(|| "unknown".to_string()),
        size: str_at(compute, &["properties", "properties", "vmSize"]),
    }
}

fn str_at(value: &Value, path: &[&str]) -> Option<String> {
    let mut current = value;
    for key in path {
        current = current.get(key)?;
    }
    current.as_str().map(|s| s.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_pipeline_definition_parses_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "displayName: demo-pipeline\njobType: Pipeline\nsettings:\n  default_compute: cpu-cluster"
        )
        .unwrap();

        let definition = load_pipeline_definition(file.path().to_str().unwrap()).unwrap();
        assert_eq!(definition["displayName"], "demo-pipeline");
        assert_eq!(definition["settings"]["default_compute"], "cpu-cluster");
    }

    #[test]
    fn load_pipeline_definition_reports_missing_file() {
        let err = load_pipeline_definition("no/such/pipeline.yml").unwrap_err();
        assert!(matches!(err, BridgeError::InvalidDefinition { ref path, .. } if path.contains("pipeline.yml")));
    }

    #[test]
    fn prepare_job_body_fills_experiment_name_only_when_absent() {
        let body = prepare_job_body(json!({"displayName": "d"}), "exp-from-caller");
        assert_eq!(body["properties"]["experimentName"], "exp-from-caller");
        assert_eq!(body["properties"]["jobType"], "Pipeline");

        let body = prepare_job_body(json!({"experimentName": "from-yaml"}), "exp-from-caller");
        assert_eq!(body["properties"]["experimentName"], "from-yaml");
    }

    #[test]
    fn job_details_parse_created_time() {
        let job = json!({
            "name": "job-1",
            "properties": {
                "status": "Completed",
                "experimentName": "exp",
                "displayName": "Job One",
            },
            "systemData": {"createdAt": "2025-03-01T12:00:00Z"},
        });

        let details = job_details_from(&job);
        assert_eq!(details.job_name, "job-1");
        assert_eq!(details.status, "Completed");
        assert_eq!(details.experiment_name.as_deref(), Some("exp"));
        assert!(details.created_time.is_some());
        assert!(details.duration.is_none());
    }

    #[test]
    fn compute_target_tolerates_missing_fields() {
        let compute = json!({"name": "cpu-cluster", "properties": {"computeType": "AmlCompute"}});
        let target = compute_target_from(&compute);
        assert_eq!(target.name, "cpu-cluster");
        assert_eq!(target.kind, "AmlCompute");
        assert_eq!(target.state, "unknown");
        assert!(target.size.is_none());
    }
}
