//! Fallback Executor
//!
//! Runs the tool calls of one assistant message and converts any failure
//! into an ordinary tool result, so the assistant can read the error and
//! retry with corrected arguments.

use super::{ToolError, ToolRegistry};
use crate::types::{ToolCall, ToolResult};
use futures::future::join_all;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tracing::{debug, warn};

/// Appended to every error result.
pub const ERROR_SUFFIX: &str = "please fix your mistakes.";

/// Render a tool failure the way the assistant sees it.
pub fn format_tool_error(error: &ToolError) -> String {
    format!("Error: {}\n{}", error, ERROR_SUFFIX)
}

#[derive(Debug, Clone)]
pub struct FallbackExecutor {
    registry: ToolRegistry,
    parallel: bool,
}

impl FallbackExecutor {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry,
            parallel: false,
        }
    }

    /// Dispatch the calls of one batch concurrently. Results keep request order.
    pub fn parallel(mut self, enable: bool) -> Self {
        self.parallel = enable;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Execute one call. Never fails: errors become an `is_error` result tied
    /// to the same call id.
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        debug!(tool = %call.name, id = %call.id, "executing tool call");
        let outcome = AssertUnwindSafe(self.registry.call(&call.name, call.arguments.clone()))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(ToolError::Execution(panic_message(payload))))
            .and_then(|value| {
                serde_json::to_string(&value).map_err(|e| ToolError::Execution(e.to_string()))
            });

        match outcome {
            Ok(content) => ToolResult {
                tool_call_id: call.id.clone(),
                content,
                is_error: false,
            },
            Err(err) => {
                warn!(tool = %call.name, id = %call.id, error = %err, "tool call failed");
                ToolResult {
                    tool_call_id: call.id.clone(),
                    content: format_tool_error(&err),
                    is_error: true,
                }
            }
        }
    }

    /// Execute a batch. The returned results are in the same order as `calls`.
    pub async fn execute_all(&self, calls: &[ToolCall]) -> Vec<ToolResult> {
        if self.parallel {
            join_all(calls.iter().map(|call| self.execute(call))).await
        } else {
            let mut results = Vec::with_capacity(calls.len());
            for call in calls {
                results.push(self.execute(call).await);
            }
            results
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown cause".to_string());
    format!("tool panicked: {}", detail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::Tool;
    use crate::types::ToolDefinition;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Arc;

    struct PanickingTool;

    #[async_trait]
    impl Tool for PanickingTool {
        fn name(&self) -> &str {
            "explode"
        }

        fn definition(&self) -> ToolDefinition {
            ToolDefinition::function("explode", "always panics", json!({"type": "object"}))
        }

        async fn call(&self, _arguments: Value) -> Result<Value, ToolError> {
            panic!("boom")
        }
    }

    fn call(id: &str, weight: f64) -> ToolCall {
        ToolCall::new(
            id,
            "calculate_health_metrics",
            json!({"weight_kg": weight, "height_cm": 170, "age": 30, "gender": "male"}),
        )
    }

    #[tokio::test]
    async fn test_error_format() {
        let executor = FallbackExecutor::new(ToolRegistry::with_health_tools());
        let result = executor.execute(&call("c1", 300.0)).await;
        assert!(result.is_error);
        assert_eq!(result.tool_call_id, "c1");
        assert_eq!(
            result.content,
            "Error: Weight must be between 40-200 kg. Got: 300kg\nplease fix your mistakes."
        );
    }

    #[tokio::test]
    async fn test_batch_keeps_request_order() {
        for parallel in [false, true] {
            let executor =
                FallbackExecutor::new(ToolRegistry::with_health_tools()).parallel(parallel);
            let results = executor
                .execute_all(&[call("a", 70.0), call("b", 10.0), call("c", 80.0)])
                .await;
            let ids: Vec<&str> = results.iter().map(|r| r.tool_call_id.as_str()).collect();
            assert_eq!(ids, ["a", "b", "c"]);
            assert_eq!(
                results.iter().map(|r| r.is_error).collect::<Vec<_>>(),
                [false, true, false]
            );
        }
    }

    #[tokio::test]
    async fn test_panicking_tool_becomes_error_result() {
        let mut registry = ToolRegistry::with_health_tools();
        registry.register(Arc::new(PanickingTool));

        for parallel in [false, true] {
            let executor = FallbackExecutor::new(registry.clone()).parallel(parallel);
            let results = executor
                .execute_all(&[
                    ToolCall::new("p", "explode", json!({})),
                    call("ok", 70.0),
                ])
                .await;

            assert_eq!(results.len(), 2);
            assert!(results[0].is_error);
            assert_eq!(results[0].tool_call_id, "p");
            assert_eq!(
                results[0].content,
                "Error: Tool execution failed: tool panicked: boom\nplease fix your mistakes."
            );
            assert!(!results[1].is_error);
        }
    }
}
