//! Pure demonstration tools: no backend, no I/O.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::registry::{Capability, ParamKind, ParamSpec};

use super::require_number;
use super::require_str;

/// Generate a friendly greeting message.
pub fn greet(name: &str) -> String {
    format!("Hello, {name}! Welcome to the MCP Foundry ML integration.")
}

/// Add two numbers and return the sum with metadata.
pub fn add_numbers(a: f64, b: f64) -> Value {
    let sum = a + b;
    json!({
        "sum": number_value(sum),
        "inputs": {"a": number_value(a), "b": number_value(b)},
        "operation": format!("{} + {} = {}", render_number(a), render_number(b), render_number(sum)),
    })
}

/// Multiply two numbers and return the product with metadata.
pub fn multiply_numbers(a: f64, b: f64) -> Value {
    let product = a * b;
    json!({
        "product": number_value(product),
        "inputs": {"a": number_value(a), "b": number_value(b)},
        "operation": format!("{} × {} = {}", render_number(a), render_number(b), render_number(product)),
    })
}

// Integral values render without a fractional part ("10", not "10.0") so
// the payload matches what callers sent in.
fn render_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        json!(n as i64)
    } else {
        json!(n)
    }
}

// ---------------------------------------------------------------------------
// Capability constructors
// ---------------------------------------------------------------------------

pub fn greet_capability() -> Capability {
    Capability::new(
        "greet",
        "Greet someone by name",
        Arc::new(|params| {
            Box::pin(async move {
                let name = require_str(&params, "name")?;
                tracing::info!(name = %name, "greet called");
                Ok(json!(greet(&name)))
            })
        }),
    )
    .with_param(ParamSpec::required("name", ParamKind::String))
}

pub fn add_numbers_capability() -> Capability {
    Capability::new(
        "add_numbers",
        "Add two numbers together",
        Arc::new(|params| {
            Box::pin(async move {
                let a = require_number(&params, "a")?;
                let b = require_number(&params, "b")?;
                tracing::info!(a, b, "add_numbers called");
                Ok(add_numbers(a, b))
            })
        }),
    )
    .with_param(ParamSpec::required("a", ParamKind::Number))
    .with_param(ParamSpec::required("b", ParamKind::Number))
}

pub fn multiply_numbers_capability() -> Capability {
    Capability::new(
        "multiply_numbers",
        "Multiply two numbers together",
        Arc::new(|params| {
            Box::pin(async move {
                let a = require_number(&params, "a")?;
                let b = require_number(&params, "b")?;
                tracing::info!(a, b, "multiply_numbers called");
                Ok(multiply_numbers(a, b))
            })
        }),
    )
    .with_param(ParamSpec::required("a", ParamKind::Number))
    .with_param(ParamSpec::required("b", ParamKind::Number))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{Dispatcher, InvocationRequest};
    use crate::registry::CapabilityRegistry;
    use std::collections::HashMap;

    fn dispatcher() -> Dispatcher {
        let mut registry = CapabilityRegistry::new();
        registry.register(greet_capability()).unwrap();
        registry.register(add_numbers_capability()).unwrap();
        registry.register(multiply_numbers_capability()).unwrap();
        Dispatcher::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn greet_returns_welcome_message() {
        let mut params = HashMap::new();
        params.insert("name".to_string(), json!("Ada"));

        let result = dispatcher()
            .invoke(InvocationRequest::new("greet", params))
            .await;

        assert!(result.is_success());
        assert_eq!(
            result.result,
            json!("Hello, Ada! Welcome to the MCP Foundry ML integration.")
        );
    }

    #[tokio::test]
    async fn add_numbers_returns_sum_with_metadata() {
        let mut params = HashMap::new();
        params.insert("a".to_string(), json!(10));
        params.insert("b".to_string(), json!(5));

        let result = dispatcher()
            .invoke(InvocationRequest::new("add_numbers", params))
            .await;

        assert!(result.is_success());
        assert_eq!(
            result.result,
            json!({
                "sum": 15,
                "inputs": {"a": 10, "b": 5},
                "operation": "10 + 5 = 15",
            })
        );
    }

    #[tokio::test]
    async fn add_numbers_keeps_fractional_values() {
        let mut params = HashMap::new();
        params.insert("a".to_string(), json!(1.5));
        params.insert("b".to_string(), json!(2));

        let result = dispatcher()
            .invoke(InvocationRequest::new("add_numbers", params))
            .await;

        assert!(result.is_success());
        assert_eq!(result.result["sum"], json!(3.5));
        assert_eq!(result.result["operation"], json!("1.5 + 2 = 3.5"));
    }

    #[tokio::test]
    async fn add_numbers_rejects_non_numeric_input_at_handler_level() {
        let mut params = HashMap::new();
        params.insert("a".to_string(), json!("ten"));
        params.insert("b".to_string(), json!(5));

        let result = dispatcher()
            .invoke(InvocationRequest::new("add_numbers", params))
            .await;

        assert!(!result.is_success());
        assert!(result.error.unwrap().contains("must be a number"));
    }

    #[tokio::test]
    async fn multiply_numbers_returns_product() {
        let mut params = HashMap::new();
        params.insert("a".to_string(), json!(4));
        params.insert("b".to_string(), json!(2.5));

        let result = dispatcher()
            .invoke(InvocationRequest::new("multiply_numbers", params))
            .await;

        assert!(result.is_success());
        assert_eq!(result.result["product"], json!(10));
        assert_eq!(result.result["operation"], json!("4 × 2.5 = 10"));
    }
}
