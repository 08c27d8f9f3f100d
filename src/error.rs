//! Error types for the foundry-bridge core.
//!
//! The dispatcher never lets these escape to a transport caller — they are
//! folded into [`InvocationResult`](crate::dispatch::InvocationResult)
//! envelopes at the dispatch boundary. The typed variants exist so that
//! in-process callers can branch on error kind instead of parsing messages.

use thiserror::Error;

/// Errors surfaced by the capability registry and invocation dispatcher.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The requested capability is not registered.
    #[error("unknown capability: {name}")]
    UnknownCapability { name: String },

    /// A capability with the same name is already registered.
    #[error("capability already registered: {name}")]
    DuplicateCapability { name: String },

    /// A required parameter was absent from the invocation request.
    #[error("missing required parameter '{param}' for capability '{capability}'")]
    MissingParameter { capability: String, param: String },

    /// The handler faulted while executing (returned an error or panicked).
    #[error("capability '{capability}' failed: {message}")]
    HandlerExecution { capability: String, message: String },
}

/// Errors from the ML-workspace backend bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// A required environment variable is not set.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: String },

    /// The pipeline job definition file could not be read or parsed.
    #[error("invalid pipeline definition '{path}': {message}")]
    InvalidDefinition { path: String, message: String },

    /// Transport-level HTTP failure talking to the workspace.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The workspace API answered with a non-success status.
    #[error("workspace API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },
}
