//! Tool executor
//!
//! Bridges model-requested calls to tool implementations. Arguments are
//! validated against the tool's schema before the handler runs, the handler
//! runs under its declared time budget, and every failure mode folds into a
//! [`ToolResult`] - the dispatcher never sees a tool fault as an error.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::error::ToolError;
use crate::provider::ToolCallRequest;
use crate::tools::ToolRegistry;

/// Outcome of one tool invocation, fed back to the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub call_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    pub fn ok(call_id: impl Into<String>, data: Value) -> Self {
        Self {
            call_id: call_id.into(),
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn fail(call_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Serialized form appended to history as the tool message content
    pub fn to_message_content(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                r#"{{"call_id":"{}","success":false,"error":"result serialization failed"}}"#,
                self.call_id
            )
        })
    }
}

/// Executes model-requested tool calls against the registry
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Execute one requested call.
    ///
    /// Never returns an error: unknown tools, bad arguments, timeouts, and
    /// handler faults all come back as a failed [`ToolResult`]. Side effects
    /// already taken by a failing handler are not rolled back.
    pub async fn execute(&self, call: &ToolCallRequest) -> ToolResult {
        info!(tool = %call.name, call_id = %call.call_id, "executing tool call");

        let tool = match self.registry.get(&call.name) {
            Some(tool) => tool,
            None => {
                warn!(tool = %call.name, "unknown tool requested by model");
                return ToolResult::fail(
                    call.call_id.as_str(),
                    ToolError::UnknownTool(call.name.clone()).to_string(),
                );
            }
        };

        if let Err(e) = validate_arguments(&tool.parameters_schema(), &call.arguments) {
            warn!(tool = %call.name, error = %e, "argument validation failed");
            return ToolResult::fail(call.call_id.as_str(), e.to_string());
        }

        let budget = tool.timeout();
        let outcome = tokio::time::timeout(budget, tool.execute(call.arguments.clone())).await;

        match outcome {
            Ok(Ok(output)) if output.success => ToolResult::ok(call.call_id.as_str(), output.content),
            Ok(Ok(output)) => ToolResult::fail(
                call.call_id.as_str(),
                output.error.unwrap_or_else(|| "tool reported failure".to_string()),
            ),
            Ok(Err(e)) => {
                error!(tool = %call.name, error = %e, "tool execution failed");
                ToolResult::fail(call.call_id.as_str(), e.to_string())
            }
            Err(_) => {
                error!(tool = %call.name, budget_secs = budget.as_secs(), "tool timed out");
                // The literal "timeout" is the contract with callers; the
                // budget only goes to the log line above.
                ToolResult::fail(call.call_id.as_str(), "timeout")
            }
        }
    }
}

/// Validate model-supplied arguments against a tool's JSON schema.
///
/// Checks the `required` list and the declared `type` of every known
/// property. Extra arguments not in the schema are tolerated (the model
/// sometimes invents them) but logged.
fn validate_arguments(schema: &Value, arguments: &Value) -> Result<(), ToolError> {
    let args = match arguments {
        Value::Object(map) => map,
        Value::Null => {
            // Null stands in for "no arguments"; only valid when nothing is required
            return match schema["required"].as_array() {
                Some(required) if !required.is_empty() => Err(ToolError::InvalidArguments(
                    format!("missing required parameter: {}", required[0].as_str().unwrap_or("?")),
                )),
                _ => Ok(()),
            };
        }
        other => {
            return Err(ToolError::InvalidArguments(format!(
                "arguments must be an object, got {}",
                json_type_name(other)
            )));
        }
    };

    if let Some(required) = schema["required"].as_array() {
        for name in required.iter().filter_map(Value::as_str) {
            if !args.contains_key(name) {
                return Err(ToolError::InvalidArguments(format!(
                    "missing required parameter: {}",
                    name
                )));
            }
        }
    }

    let properties = schema["properties"].as_object();
    for (name, value) in args {
        let declared = properties
            .and_then(|props| props.get(name))
            .and_then(|p| p["type"].as_str());

        match declared {
            Some(expected) => {
                if !type_matches(expected, value) {
                    return Err(ToolError::InvalidArguments(format!(
                        "parameter '{}' expected {}, got {}",
                        name,
                        expected,
                        json_type_name(value)
                    )));
                }
            }
            None => {
                warn!(parameter = %name, "argument not declared in tool schema");
            }
        }
    }

    Ok(())
}

fn type_matches(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        _ => true,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
