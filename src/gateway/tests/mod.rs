//! Unit tests for the tool gateway.

mod classify_tests;

use crate::policy::domain::ToolArgs;
use serde_json::Value;

fn args(value: Value) -> ToolArgs {
    match value {
        Value::Object(map) => map,
        _ => ToolArgs::new(),
    }
}
