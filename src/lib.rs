//! # foundry-bridge
//!
//! An MCP-style bridge connecting Foundry agents to Azure ML pipelines.
//!
//! Three layers: a demo [`agent`] client that picks a tool by keyword
//! matching, an HTTP [`server`] exposing the registered tools, and a
//! [`bridge`] wrapping the Azure ML workspace REST surface. The structural
//! core is the capability [`registry`] plus the [`dispatch`]er, which
//! normalizes every invocation outcome into a success/error envelope.

pub mod agent;
pub mod bridge;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod registry;
pub mod server;
pub mod tools;

// Re-exports for the common invocation surface
pub use dispatch::{Dispatcher, InvocationRequest, InvocationResult, InvocationStatus};
pub use error::{BridgeError, DispatchError};
pub use registry::{Capability, CapabilityRegistry, ParamKind, ParamSpec};

/// Library version.
pub const VERSION: &str = "1.0.0";
