//! Environment-backed configuration for the server and the Azure ML bridge.
//!
//! Both structs are plain values constructed once at startup (or per bridge
//! construction) and passed explicitly — there is no ambient global
//! configuration. The binaries load a `.env` file via `dotenvy` before
//! reading these.

use std::env;
use std::time::Duration;

use crate::error::BridgeError;

/// Default outbound HTTP timeout for backend calls, in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

/// Configuration for the bridge HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Display name used on the info page.
    pub name: String,
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "MCP Foundry Bridge Server".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl ServerConfig {
    /// Build the configuration from `MCP_SERVER_*` environment variables,
    /// falling back to the defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            name: env::var("MCP_SERVER_NAME").unwrap_or(defaults.name),
            host: env::var("MCP_SERVER_HOST").unwrap_or(defaults.host),
            port: env::var("MCP_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
        }
    }

    /// `host:port` string suitable for a TCP bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ---------------------------------------------------------------------------
// AzureMlConfig
// ---------------------------------------------------------------------------

/// Workspace identity and credentials for the Azure ML bridge.
///
/// The access token is supplied out-of-band (e.g. `az account
/// get-access-token`); no authentication flow lives in this crate.
#[derive(Debug, Clone)]
pub struct AzureMlConfig {
    pub subscription_id: String,
    pub resource_group: String,
    pub workspace_name: String,
    /// Bearer token for the management-plane REST calls.
    pub access_token: String,
    /// Bound on any single outbound call to the workspace.
    pub http_timeout: Duration,
}

impl AzureMlConfig {
    /// Build the configuration from environment variables.
    ///
    /// Required: `AZURE_SUBSCRIPTION_ID`, `AZURE_RESOURCE_GROUP`,
    /// `AZURE_ML_WORKSPACE`, `AZURE_ML_TOKEN`. Optional:
    /// `AZURE_ML_HTTP_TIMEOUT_SECS` (default 60).
    pub fn from_env() -> Result<Self, BridgeError> {
        let timeout_secs = env::var("AZURE_ML_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);

        Ok(Self {
            subscription_id: require_env("AZURE_SUBSCRIPTION_ID")?,
            resource_group: require_env("AZURE_RESOURCE_GROUP")?,
            workspace_name: require_env("AZURE_ML_WORKSPACE")?,
            access_token: require_env("AZURE_ML_TOKEN")?,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn require_env(name: &str) -> Result<String, BridgeError> {
    env::var(name).map_err(|_| BridgeError::MissingEnv {
        name: name.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
