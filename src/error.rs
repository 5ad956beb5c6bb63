use crate::transport::TransportError;
use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "config.api_key", "candidates[0].content")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "config_loader", "gemini_driver")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Violations of the conversation transcript invariants.
///
/// These signal a defect in whoever assembled the loop or the assistant
/// step; they are never converted into conversation content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("tool result references unknown tool call id '{tool_call_id}'")]
    UnknownToolCallId { tool_call_id: String },

    #[error("tool call id '{tool_call_id}' already has a result")]
    DuplicateToolResult { tool_call_id: String },

    #[error("tool call id '{tool_call_id}' is not unique within the conversation")]
    DuplicateToolCallId { tool_call_id: String },

    #[error("cannot resume an empty transcript")]
    EmptyTranscript,
}

/// Unified error type for the agent runtime.
///
/// Tool failures never show up here: they are folded into the transcript by
/// the tool fallback. Everything below aborts the current run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Conversation protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Assistant step failed: {message}{}", format_context(.context))]
    Assistant {
        message: String,
        context: ErrorContext,
    },

    #[error("Checkpoint error: {message}{}", format_context(.context))]
    Checkpoint {
        message: String,
        context: ErrorContext,
    },

    #[error("Recursion limit of {limit} assistant steps reached without a final answer")]
    RecursionLimit { limit: usize },

    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Create a new assistant-step error with structured context
    pub fn assistant_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Assistant {
            message: msg.into(),
            context,
        }
    }

    /// Create a new checkpoint error with structured context
    pub fn checkpoint_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Checkpoint {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. }
            | Error::Assistant { context, .. }
            | Error::Checkpoint { context, .. } => Some(context),
            _ => None,
        }
    }
}
