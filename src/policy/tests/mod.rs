//! Unit tests for the policy module.

mod rule_tests;

use crate::policy::domain::ToolArgs;
use serde_json::Value;

/// Builds tool arguments from a JSON object literal.
fn args(value: Value) -> ToolArgs {
    match value {
        Value::Object(map) => map,
        _ => ToolArgs::new(),
    }
}
