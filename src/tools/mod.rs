//! Tool execution: the tool trait, the registry and the error fallback.
//!
//! # Tools Module
//!
//! Tools are the only way the assistant step reaches deterministic code. Each
//! tool takes JSON arguments, deserializes them into a typed request at the
//! boundary and returns a JSON value.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`Tool`] | Async trait implemented by every tool |
//! | [`ToolRegistry`] | Name → tool lookup, in registration order |
//! | [`FallbackExecutor`] | Runs tool calls and folds failures into tool results |
//! | [`CalculateHealthMetricsTool`] | The `calculate_health_metrics` tool |
//!
//! Failures never escape a tool call: [`FallbackExecutor`] turns every
//! [`ToolError`] into a tool result of the form
//! `Error: <description>\nplease fix your mistakes.`

mod fallback;
mod health;
mod registry;

pub use fallback::{format_tool_error, FallbackExecutor, ERROR_SUFFIX};
pub use health::{
    CalculateHealthMetricsArgs, CalculateHealthMetricsTool, HealthMetricsReport, InputSummary,
    TOOL_NAME as CALCULATE_HEALTH_METRICS,
};
pub use registry::ToolRegistry;

use crate::health::ValidationError;
use crate::types::ToolDefinition;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Failure raised while executing a single tool call.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid arguments for tool '{tool}': {source}")]
    InvalidArguments {
        tool: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown tool '{name}'. Available tools: {available}")]
    UnknownTool { name: String, available: String },

    #[error("Tool execution failed: {0}")]
    Execution(String),
}

/// A callable tool exposed to the assistant step.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name, as the assistant refers to it.
    fn name(&self) -> &str;

    /// Definition advertised to the model, including the JSON Schema of the arguments.
    fn definition(&self) -> ToolDefinition;

    async fn call(&self, arguments: Value) -> Result<Value, ToolError>;
}
