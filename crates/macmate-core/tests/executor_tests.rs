//! Tool executor integration tests
//!
//! Covers the executor's contract: schema validation before invocation,
//! per-tool timeouts, and fault folding into failed results.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use macmate_core::{
    Tool, ToolCallRequest, ToolError, ToolExecutor, ToolOutput, ToolRegistry,
};

/// A tool that counts its invocations
struct CountingTool {
    invocations: Arc<AtomicUsize>,
}

#[async_trait]
impl Tool for CountingTool {
    fn name(&self) -> &str {
        "counting"
    }

    fn description(&self) -> &str {
        "Counts how often it runs"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "label": {"type": "string"},
                "count": {"type": "integer"}
            },
            "required": ["label"]
        })
    }

    async fn execute(&self, params: Value) -> Result<ToolOutput, ToolError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        Ok(ToolOutput::success(json!({
            "label": params["label"]
        })))
    }
}

/// A tool that always fails
struct FaultyTool;

#[async_trait]
impl Tool for FaultyTool {
    fn name(&self) -> &str {
        "faulty"
    }

    fn description(&self) -> &str {
        "Always fails"
    }

    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {}, "required": []})
    }

    async fn execute(&self, _params: Value) -> Result<ToolOutput, ToolError> {
        Err(ToolError::ExecutionFailed("disk on fire".to_string()))
    }
}

/// A tool that outlives its own time budget
struct SleepyTool;

#[async_trait]
impl Tool for SleepyTool {
    fn name(&self) -> &str {
        "sleepy"
    }

    fn description(&self) -> &str {
        "Sleeps past its budget"
    }

    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {}, "required": []})
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(50)
    }

    async fn execute(&self, _params: Value) -> Result<ToolOutput, ToolError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(ToolOutput::success("never reached"))
    }
}

fn setup() -> (ToolExecutor, Arc<AtomicUsize>) {
    let invocations = Arc::new(AtomicUsize::new(0));

    let mut registry = ToolRegistry::new();
    registry
        .register(Arc::new(CountingTool {
            invocations: invocations.clone(),
        }))
        .unwrap();
    registry.register(Arc::new(FaultyTool)).unwrap();
    registry.register(Arc::new(SleepyTool)).unwrap();

    (ToolExecutor::new(Arc::new(registry)), invocations)
}

#[tokio::test]
async fn test_valid_call_succeeds() {
    let (executor, invocations) = setup();

    let call = ToolCallRequest::new("c1", "counting", json!({"label": "hello"}));
    let result = executor.execute(&call).await;

    assert!(result.success);
    assert_eq!(result.call_id, "c1");
    assert!(result.data.is_some());
    assert!(result.error.is_none());
    assert_eq!(invocations.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_missing_required_parameter_never_invokes_handler() {
    let (executor, invocations) = setup();

    let call = ToolCallRequest::new("c2", "counting", json!({"count": 3}));
    let result = executor.execute(&call).await;

    assert!(!result.success);
    assert!(result.error.as_deref().unwrap_or("").contains("label"));
    assert_eq!(invocations.load(Ordering::SeqCst), 0, "handler must not run");
}

#[tokio::test]
async fn test_type_mismatch_never_invokes_handler() {
    let (executor, invocations) = setup();

    let call = ToolCallRequest::new("c3", "counting", json!({"label": 42}));
    let result = executor.execute(&call).await;

    assert!(!result.success);
    assert_eq!(invocations.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unknown_tool_is_failed_result() {
    let (executor, _) = setup();

    let call = ToolCallRequest::new("c4", "no_such_tool", json!({}));
    let result = executor.execute(&call).await;

    assert!(!result.success);
    assert!(result.error.as_deref().unwrap_or("").contains("no_such_tool"));
}

#[tokio::test]
async fn test_handler_fault_folds_into_result() {
    let (executor, _) = setup();

    let call = ToolCallRequest::new("c5", "faulty", json!({}));
    let result = executor.execute(&call).await;

    assert!(!result.success);
    let error = result.error.expect("error must be populated");
    assert!(!error.is_empty());
    assert!(error.contains("disk on fire"));
}

#[tokio::test]
async fn test_timeout_produces_timeout_error() {
    let (executor, _) = setup();

    let call = ToolCallRequest::new("c6", "sleepy", json!({}));
    let result = executor.execute(&call).await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("timeout"));
}

#[tokio::test]
async fn test_executor_survives_failures() {
    // A failed call leaves the executor fully usable
    let (executor, invocations) = setup();

    let bad = ToolCallRequest::new("c7", "faulty", json!({}));
    assert!(!executor.execute(&bad).await.success);

    let good = ToolCallRequest::new("c8", "counting", json!({"label": "after"}));
    assert!(executor.execute(&good).await.success);
    assert_eq!(invocations.load(Ordering::SeqCst), 1);
}
