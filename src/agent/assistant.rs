//! The assistant step: given the transcript, produce the next assistant message.

use super::ConversationState;
use crate::config::AgentConfig;
use crate::drivers::{create_driver, GenerationParams, ProviderDriver};
use crate::error::{Error, ErrorContext};
use crate::prompt::SYSTEM_PROMPT;
use crate::transport::{HttpTransport, RetryConfig};
use crate::types::{Message, ToolCall, ToolDefinition};
use crate::Result;
use async_trait::async_trait;
use tracing::{debug, info};

/// Output of one assistant step: text plus zero or more tool requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssistantReply {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

impl AssistantReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: content.into(),
            tool_calls,
        }
    }
}

impl From<AssistantReply> for Message {
    fn from(reply: AssistantReply) -> Self {
        Message::assistant_with_tool_calls(reply.content, reply.tool_calls)
    }
}

/// Capability backing the assistant step.
///
/// Implementations may perform arbitrary external calls. An `Err` aborts the
/// conversation run; it is not folded into the transcript.
#[async_trait]
pub trait AssistantStep: Send + Sync {
    async fn respond(&self, state: &ConversationState) -> Result<AssistantReply>;
}

/// Assistant step backed by a hosted model over HTTP.
#[derive(Debug)]
pub struct HttpAssistant {
    driver: Box<dyn ProviderDriver>,
    transport: HttpTransport,
    params: GenerationParams,
    system_prompt: String,
    tools: Vec<ToolDefinition>,
}

impl HttpAssistant {
    /// Build from configuration, binding the given tool definitions.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no API key can be resolved.
    pub fn from_config(config: &AgentConfig, tools: Vec<ToolDefinition>) -> Result<Self> {
        let api_key = config.resolve_api_key().ok_or_else(|| {
            Error::configuration_with_context(
                "no API key configured",
                ErrorContext::new()
                    .with_field_path(config.provider.api_key_env())
                    .with_details("set the env variable or store the key in the OS keyring")
                    .with_source("http_assistant"),
            )
        })?;

        let driver = create_driver(config.provider);
        let retry = RetryConfig {
            max_retries: config.max_retries,
            ..RetryConfig::default()
        };
        let transport = HttpTransport::new(
            config.base_url(),
            Some(api_key),
            driver.auth(),
            config.timeout(),
            retry,
        )?;

        Ok(Self {
            driver,
            transport,
            params: GenerationParams {
                model: config.model().to_string(),
                temperature: Some(config.temperature),
                max_tokens: Some(config.max_tokens),
            },
            system_prompt: config
                .system_prompt
                .clone()
                .unwrap_or_else(|| SYSTEM_PROMPT.to_string()),
            tools,
        })
    }

    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }
}

#[async_trait]
impl AssistantStep for HttpAssistant {
    async fn respond(&self, state: &ConversationState) -> Result<AssistantReply> {
        let body = self
            .driver
            .build_request(&self.system_prompt, state, &self.tools, &self.params)?;
        let path = self.driver.endpoint(&self.params.model);

        info!(
            provider = self.driver.provider().as_str(),
            model = %self.params.model,
            messages = state.len(),
            "invoking assistant"
        );
        let raw = self.transport.post_json(&path, &body).await?;
        let response = self.driver.parse_response(&raw)?;
        debug!(
            finish_reason = ?response.finish_reason,
            usage = ?response.usage,
            tool_calls = response.tool_calls.len(),
            "assistant replied"
        );

        Ok(AssistantReply {
            content: response.content,
            tool_calls: response.tool_calls,
        })
    }
}
