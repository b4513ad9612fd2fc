//! Evaluate a single hyper value

use crate::error::{CliError, CliResult};
use serde_json::Value;
use tango_engine::{EngineConfig, Scope, Workspace};
use tango_types::HyperValue;

/// Evaluate `value` (a `{type, value}` JSON document) against `scope`
///
/// Prints the result as JSON, or `undefined` when there is none.
pub fn eval(value: &str, scope: Option<&str>, config: EngineConfig) -> CliResult<String> {
    let value: HyperValue = serde_json::from_str(value)?;
    let scope = match scope {
        Some(text) => match serde_json::from_str(text)? {
            Value::Object(map) => map,
            _ => return Err(CliError::InvalidInput("scope must be a JSON object".into())),
        },
        None => Scope::new(),
    };

    let workspace = Workspace::new(config);
    let result = workspace.evaluate(&scope, &value)?;
    Ok(result
        .into_json()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "undefined".to_string()))
}
