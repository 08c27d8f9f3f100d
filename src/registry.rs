//! Capability registry: the authoritative mapping of capability name to
//! definition.
//!
//! A [`Capability`] bundles a unique name, a human-readable description, an
//! ordered parameter spec, and the handler closure that executes it. The
//! registry is populated once at startup and shared read-only behind an
//! `Arc` afterwards, so concurrent lookups need no synchronization.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DispatchError;

/// Boxed error type returned by capability handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for a boxed asynchronous capability handler.
///
/// Handlers receive the caller-supplied parameter mapping (already checked
/// for required keys by the dispatcher) and produce a JSON payload or fail.
pub type HandlerFn = Arc<
    dyn Fn(HashMap<String, Value>) -> BoxFuture<'static, Result<Value, HandlerError>>
        + Send
        + Sync,
>;

// ---------------------------------------------------------------------------
// Parameter spec
// ---------------------------------------------------------------------------

/// Expected kind of a capability parameter.
///
/// Kinds are advertised through the discovery listing; the dispatcher does
/// not coerce values, so a mismatched kind surfaces as a handler-level
/// failure rather than a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    String,
    Number,
    Mapping,
    Any,
}

/// Declaration of a single capability parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name as it appears in the invocation mapping.
    pub name: String,
    /// Whether the dispatcher rejects invocations missing this parameter.
    pub required: bool,
    /// Advertised value kind.
    pub kind: ParamKind,
}

impl ParamSpec {
    /// Declare a required parameter.
    pub fn required(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            required: true,
            kind,
        }
    }

    /// Declare an optional parameter.
    pub fn optional(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            required: false,
            kind,
        }
    }
}

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

/// A named, registered unit of invocable behavior.
///
/// Immutable once registered; the registry owns it for the process lifetime.
#[derive(Clone)]
pub struct Capability {
    name: String,
    description: String,
    params: Vec<ParamSpec>,
    handler: HandlerFn,
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("params", &self.params)
            .finish()
    }
}

impl Capability {
    /// Create a new capability wrapping the given handler.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        handler: HandlerFn,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params: Vec::new(),
            handler,
        }
    }

    /// Builder method appending a parameter declaration.
    pub fn with_param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    /// The unique name of the capability.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable description for discovery/help listings.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Ordered parameter declarations.
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// The handler closure.
    pub(crate) fn handler(&self) -> HandlerFn {
        Arc::clone(&self.handler)
    }
}

// ---------------------------------------------------------------------------
// CapabilityRegistry
// ---------------------------------------------------------------------------

/// Name-keyed store of capabilities with stable registration order.
///
/// Entries live in a `Vec` so that [`CapabilityRegistry::list`] yields the
/// same order on every iteration; the side index gives O(1) lookup by name.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    entries: Vec<Arc<Capability>>,
    index: HashMap<String, usize>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability. Fails if the name is already taken.
    pub fn register(&mut self, capability: Capability) -> Result<(), DispatchError> {
        if self.index.contains_key(capability.name()) {
            return Err(DispatchError::DuplicateCapability {
                name: capability.name().to_string(),
            });
        }
        self.index
            .insert(capability.name().to_string(), self.entries.len());
        self.entries.push(Arc::new(capability));
        Ok(())
    }

    /// Look up a capability by name.
    pub fn lookup(&self, name: &str) -> Result<&Arc<Capability>, DispatchError> {
        self.index
            .get(name)
            .map(|&i| &self.entries[i])
            .ok_or_else(|| DispatchError::UnknownCapability {
                name: name.to_string(),
            })
    }

    /// Iterate all capabilities in registration order.
    ///
    /// The iterator is finite and restartable: calling `list` again yields
    /// the same sequence in the same order.
    pub fn list(&self) -> impl Iterator<Item = &Arc<Capability>> {
        self.entries.iter()
    }

    /// Number of registered capabilities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
