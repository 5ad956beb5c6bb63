//! Provider driver abstraction: translates the transcript into a provider's
//! wire format and parses the reply back into an assistant message.
//!
//! Uses `Box<dyn ProviderDriver>` so the HTTP assistant works unchanged with
//! Gemini and any OpenAI-compatible endpoint.

pub mod gemini;

use serde_json::{json, Value};

use crate::agent::ConversationState;
use crate::config::Provider;
use crate::error::{Error, ErrorContext};
use crate::transport::Auth;
use crate::types::{Message, ToolCall, ToolDefinition};

pub use gemini::GeminiDriver;

/// Sampling parameters forwarded to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub model: String,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

/// Unified reply parsed from a provider response.
#[derive(Debug, Clone, Default)]
pub struct DriverResponse {
    /// Concatenated text content (may be empty when only tools are called).
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    /// Finish reason normalized to lowercase OpenAI vocabulary.
    pub finish_reason: Option<String>,
    pub usage: Option<UsageInfo>,
}

/// Token usage information.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageInfo {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// Provider-specific request/response adaptation.
pub trait ProviderDriver: Send + Sync + std::fmt::Debug {
    fn provider(&self) -> Provider;

    /// How the transport attaches the API key.
    fn auth(&self) -> Auth;

    /// Path appended to the base URL for a chat turn.
    fn endpoint(&self, model: &str) -> String;

    /// Build the request body for one assistant step.
    fn build_request(
        &self,
        system_prompt: &str,
        state: &ConversationState,
        tools: &[ToolDefinition],
        params: &GenerationParams,
    ) -> Result<Value, Error>;

    /// Parse a non-streaming response.
    fn parse_response(&self, body: &Value) -> Result<DriverResponse, Error>;
}

/// OpenAI chat-completions driver. Also covers DeepSeek, Groq, Ollama and
/// other compatible endpoints.
#[derive(Debug, Default)]
pub struct OpenAiDriver;

impl OpenAiDriver {
    pub fn new() -> Self {
        Self
    }

    fn message_to_value(message: &Message) -> Value {
        match message {
            Message::User { content } => json!({ "role": "user", "content": content }),
            Message::Assistant {
                content,
                tool_calls,
            } => {
                let text = if content.is_empty() {
                    Value::Null
                } else {
                    Value::String(content.clone())
                };
                let mut obj = json!({ "role": "assistant", "content": text });
                if !tool_calls.is_empty() {
                    obj["tool_calls"] = tool_calls
                        .iter()
                        .map(|c| {
                            json!({
                                "id": c.id,
                                "type": "function",
                                "function": {
                                    "name": c.name,
                                    "arguments": c.arguments.to_string(),
                                }
                            })
                        })
                        .collect();
                }
                obj
            }
            Message::ToolResult {
                tool_call_id,
                content,
            } => json!({ "role": "tool", "tool_call_id": tool_call_id, "content": content }),
        }
    }

    fn parse_tool_call(raw: &Value) -> Result<ToolCall, Error> {
        let id = raw["id"].as_str().ok_or_else(|| malformed("tool_calls[].id"))?;
        let name = raw
            .pointer("/function/name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| malformed("tool_calls[].function.name"))?;
        // Arguments arrive as a JSON-encoded string. Unparseable arguments are
        // kept verbatim so the tool rejects them through the fallback.
        let arguments = match raw.pointer("/function/arguments") {
            Some(Value::String(s)) => {
                serde_json::from_str(s).unwrap_or_else(|_| Value::String(s.clone()))
            }
            Some(other) => other.clone(),
            None => json!({}),
        };
        Ok(ToolCall::new(id, name, arguments))
    }
}

impl ProviderDriver for OpenAiDriver {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    fn auth(&self) -> Auth {
        Auth::Bearer
    }

    fn endpoint(&self, _model: &str) -> String {
        "/chat/completions".to_string()
    }

    fn build_request(
        &self,
        system_prompt: &str,
        state: &ConversationState,
        tools: &[ToolDefinition],
        params: &GenerationParams,
    ) -> Result<Value, Error> {
        let mut messages = Vec::with_capacity(state.len() + 1);
        if !system_prompt.is_empty() {
            messages.push(json!({ "role": "system", "content": system_prompt }));
        }
        messages.extend(state.messages().iter().map(Self::message_to_value));

        let mut body = json!({
            "model": params.model,
            "messages": messages,
            "stream": false,
        });

        if let Some(t) = params.temperature {
            body["temperature"] = json!(t);
        }
        if let Some(mt) = params.max_tokens {
            body["max_tokens"] = json!(mt);
        }
        if !tools.is_empty() {
            body["tools"] = serde_json::to_value(tools)?;
            body["tool_choice"] = json!("auto");
        }

        Ok(body)
    }

    fn parse_response(&self, body: &Value) -> Result<DriverResponse, Error> {
        let message = body
            .pointer("/choices/0/message")
            .ok_or_else(|| malformed("choices[0].message"))?;

        let content = message["content"].as_str().unwrap_or_default().to_string();
        let tool_calls = message["tool_calls"]
            .as_array()
            .map(|calls| {
                calls
                    .iter()
                    .map(Self::parse_tool_call)
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?
            .unwrap_or_default();
        let finish_reason = body
            .pointer("/choices/0/finish_reason")
            .and_then(|v| v.as_str())
            .map(String::from);
        let usage = body.get("usage").map(|u| UsageInfo {
            prompt_tokens: u["prompt_tokens"].as_u64().unwrap_or(0),
            completion_tokens: u["completion_tokens"].as_u64().unwrap_or(0),
            total_tokens: u["total_tokens"].as_u64().unwrap_or(0),
        });

        Ok(DriverResponse {
            content,
            tool_calls,
            finish_reason,
            usage,
        })
    }
}

pub(crate) fn malformed(field: &str) -> Error {
    Error::assistant_with_context(
        "malformed model response",
        ErrorContext::new()
            .with_field_path(field)
            .with_source("provider_driver"),
    )
}

/// Factory function to create the driver for a provider.
pub fn create_driver(provider: Provider) -> Box<dyn ProviderDriver> {
    match provider {
        Provider::Gemini => Box::new(GeminiDriver::new()),
        Provider::OpenAi => Box::new(OpenAiDriver::new()),
    }
}
