//! HTTP transport for the invocation dispatcher.
//!
//! Binds the transport-agnostic dispatcher to the reference HTTP surface:
//! an info page, a discovery listing, and the `POST /mcp/call` invocation
//! endpoint.

pub mod routes;

pub use routes::{app_router, AppState};
