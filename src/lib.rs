//! # health-metrics-agent
//!
//! A conversational health-metrics assistant: an LLM-driven loop that
//! collects a user's body measurements, calls a deterministic calculator
//! tool and explains the results.
//!
//! ## Overview
//!
//! The conversation alternates two steps. The assistant step sends the
//! transcript to a model and receives either a final answer or tool calls.
//! The tool step executes those calls; any tool failure becomes an ordinary
//! tool result ending in `please fix your mistakes.` so the model can
//! correct its arguments on the next turn.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use health_metrics_agent::{AgentBuilder, AgentConfig};
//!
//! #[tokio::main]
//! async fn main() -> health_metrics_agent::Result<()> {
//!     let agent = AgentBuilder::new()
//!         .config(AgentConfig::from_env()?)
//!         .build()?;
//!
//!     let state = agent
//!         .run_session("demo", "I'm 30, male, 70kg, 170cm, moderately active")
//!         .await?;
//!     println!("{}", state.final_answer().unwrap_or_default());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`health`] | Input validation and the BMI/BMR/TDEE calculator |
//! | [`tools`] | Tool trait, registry and the error-folding executor |
//! | [`agent`] | Transcript state, assistant step and conversation loop |
//! | [`drivers`] | Request/response mapping for Gemini and OpenAI |
//! | [`transport`] | HTTP transport with retries |
//! | [`checkpoint`] | Per-session transcript persistence |
//! | [`config`] | Agent configuration and API key resolution |
//! | [`prompt`] | System prompt and welcome text |

pub mod agent;
pub mod checkpoint;
pub mod config;
pub mod drivers;
pub mod health;
pub mod prompt;
pub mod tools;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use agent::{
    AgentBuilder, AssistantReply, AssistantStep, ConversationLoop, ConversationState,
    HttpAssistant,
};
pub use checkpoint::{CheckpointStore, MemoryCheckpointStore};
pub use config::{AgentConfig, Provider};
pub use health::{compute, validate_inputs, HealthMetrics, ValidationError};
pub use tools::{FallbackExecutor, Tool, ToolError, ToolRegistry};
pub use types::{Message, MessageRole, ToolCall, ToolDefinition, ToolResult};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext, ProtocolError};
