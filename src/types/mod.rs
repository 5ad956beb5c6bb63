//! Core conversation data types.
//!
//! # Types Module
//!
//! Strongly typed representations of everything that flows through the
//! conversation loop: transcript messages, tool call requests, tool results and
//! the tool definitions advertised to the assistant step.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Message`] | User, assistant or tool-result message |
//! | [`MessageRole`] | Role of a message |
//! | [`ToolCall`] | Tool invocation requested by the assistant |
//! | [`ToolResult`] | Outcome of one tool call |
//! | [`ToolDefinition`] | Tool definition for model context |
//!
//! ## Example
//!
//! ```rust
//! use health_metrics_agent::types::{Message, ToolCall};
//! use serde_json::json;
//!
//! let user = Message::user("70kg, 170cm, 30, male, moderate");
//! let call = ToolCall::new("call_1", "calculate_health_metrics", json!({"weight_kg": 70}));
//! let assistant = Message::assistant_with_tool_calls("", vec![call]);
//! assert_eq!(assistant.tool_calls().len(), 1);
//! assert!(user.tool_calls().is_empty());
//! ```

pub mod message;
pub mod tool;

pub use message::{Message, MessageRole};
pub use tool::{FunctionDefinition, ToolCall, ToolDefinition, ToolResult};
