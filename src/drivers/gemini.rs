//! Gemini generateContent driver.
//!
//! Key differences from the OpenAI format:
//! - Uses `contents` instead of `messages`, with `parts` instead of `content`.
//! - Roles: `user` and `model`. The system prompt goes in `system_instruction`.
//! - Tool calls are `functionCall` parts without ids; ids are synthesized here.
//! - Tool results are `functionResponse` parts addressed by tool name.
//! - API key is passed as `?key=` query parameter, not in headers.

use serde_json::{json, Map, Value};

use crate::agent::ConversationState;
use crate::config::Provider;
use crate::error::{Error, ErrorContext};
use crate::transport::Auth;
use crate::types::{Message, ToolCall, ToolDefinition};

use super::{malformed, DriverResponse, GenerationParams, ProviderDriver, UsageInfo};

/// Schema keywords accepted by Gemini function declarations.
const SCHEMA_KEYS: &[&str] = &[
    "type",
    "format",
    "description",
    "nullable",
    "enum",
    "properties",
    "required",
    "items",
    "minimum",
    "maximum",
];

/// Finish reasons that mean the candidate was withheld.
const BLOCKING_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "RECITATION",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
];

#[derive(Debug, Default)]
pub struct GeminiDriver;

impl GeminiDriver {
    pub fn new() -> Self {
        Self
    }

    fn contents(state: &ConversationState) -> Vec<Value> {
        let mut contents: Vec<Value> = Vec::new();
        // Consecutive tool results travel together in one `user` turn.
        let mut pending_responses: Vec<Value> = Vec::new();

        for message in state.messages() {
            if let Message::ToolResult {
                tool_call_id,
                content,
            } = message
            {
                let name = state.tool_name_for(tool_call_id).unwrap_or_default();
                let output = serde_json::from_str::<Value>(content)
                    .unwrap_or_else(|_| Value::String(content.clone()));
                pending_responses.push(json!({
                    "functionResponse": {
                        "name": name,
                        "response": { "content": output },
                    }
                }));
                continue;
            }

            if !pending_responses.is_empty() {
                contents.push(json!({
                    "role": "user",
                    "parts": std::mem::take(&mut pending_responses),
                }));
            }

            match message {
                Message::User { content } => contents.push(json!({
                    "role": "user",
                    "parts": [{ "text": content }],
                })),
                Message::Assistant {
                    content,
                    tool_calls,
                } => {
                    let mut parts = Vec::with_capacity(tool_calls.len() + 1);
                    if !content.is_empty() || tool_calls.is_empty() {
                        parts.push(json!({ "text": content }));
                    }
                    parts.extend(tool_calls.iter().map(|c| {
                        json!({ "functionCall": { "name": c.name, "args": c.arguments } })
                    }));
                    contents.push(json!({ "role": "model", "parts": parts }));
                }
                Message::ToolResult { .. } => {}
            }
        }

        if !pending_responses.is_empty() {
            contents.push(json!({ "role": "user", "parts": pending_responses }));
        }

        contents
    }

    /// Strip JSON Schema keywords Gemini rejects (`$schema`, `default`, ...).
    fn sanitize_schema(schema: &Value) -> Value {
        match schema {
            Value::Object(map) => {
                let mut out = Map::new();
                for (key, value) in map {
                    if !SCHEMA_KEYS.contains(&key.as_str()) {
                        continue;
                    }
                    let cleaned = match key.as_str() {
                        "properties" => match value {
                            Value::Object(props) => Value::Object(
                                props
                                    .iter()
                                    .map(|(k, v)| (k.clone(), Self::sanitize_schema(v)))
                                    .collect(),
                            ),
                            other => other.clone(),
                        },
                        "items" => Self::sanitize_schema(value),
                        _ => value.clone(),
                    };
                    out.insert(key.clone(), cleaned);
                }
                Value::Object(out)
            }
            other => other.clone(),
        }
    }

    fn function_declarations(tools: &[ToolDefinition]) -> Vec<Value> {
        tools
            .iter()
            .map(|t| {
                let mut decl = json!({ "name": t.function.name });
                if let Some(desc) = &t.function.description {
                    decl["description"] = json!(desc);
                }
                if let Some(params) = &t.function.parameters {
                    decl["parameters"] = Self::sanitize_schema(params);
                }
                decl
            })
            .collect()
    }

    fn normalize_finish_reason(reason: &str) -> String {
        match reason {
            "STOP" => "stop".to_string(),
            "MAX_TOKENS" => "length".to_string(),
            "SAFETY" | "RECITATION" => "content_filter".to_string(),
            other => other.to_lowercase(),
        }
    }
}

impl ProviderDriver for GeminiDriver {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    fn auth(&self) -> Auth {
        Auth::QueryKey
    }

    fn endpoint(&self, model: &str) -> String {
        format!("/v1beta/models/{}:generateContent", model)
    }

    fn build_request(
        &self,
        system_prompt: &str,
        state: &ConversationState,
        tools: &[ToolDefinition],
        params: &GenerationParams,
    ) -> Result<Value, Error> {
        let mut body = json!({ "contents": Self::contents(state) });

        if !system_prompt.is_empty() {
            body["system_instruction"] = json!({ "parts": [{ "text": system_prompt }] });
        }

        // Gemini uses `generationConfig` for parameters
        let mut gen_config = Map::new();
        if let Some(t) = params.temperature {
            gen_config.insert("temperature".into(), json!(t));
        }
        if let Some(mt) = params.max_tokens {
            gen_config.insert("maxOutputTokens".into(), json!(mt));
        }
        if !gen_config.is_empty() {
            body["generationConfig"] = Value::Object(gen_config);
        }

        if !tools.is_empty() {
            body["tools"] = json!([{ "functionDeclarations": Self::function_declarations(tools) }]);
            body["toolConfig"] = json!({ "functionCallingConfig": { "mode": "AUTO" } });
        }

        Ok(body)
    }

    fn parse_response(&self, body: &Value) -> Result<DriverResponse, Error> {
        let candidate = body.pointer("/candidates/0").ok_or_else(|| {
            match body
                .pointer("/promptFeedback/blockReason")
                .and_then(|v| v.as_str())
            {
                Some(reason) => Error::assistant_with_context(
                    "prompt blocked by provider",
                    ErrorContext::new()
                        .with_details(reason)
                        .with_source("gemini_driver"),
                ),
                None => malformed("candidates[0]"),
            }
        })?;

        let parts = candidate
            .pointer("/content/parts")
            .and_then(|p| p.as_array())
            .cloned()
            .unwrap_or_default();

        let mut content = String::new();
        let mut tool_calls = Vec::new();
        for part in &parts {
            if let Some(text) = part.get("text").and_then(|t| t.as_str()) {
                content.push_str(text);
            }
            if let Some(call) = part.get("functionCall") {
                let name = call["name"]
                    .as_str()
                    .ok_or_else(|| malformed("candidates[0].content.parts[].functionCall.name"))?;
                let id = call["id"]
                    .as_str()
                    .map(String::from)
                    .unwrap_or_else(|| format!("call_{}", uuid::Uuid::new_v4().simple()));
                let args = call.get("args").cloned().unwrap_or_else(|| json!({}));
                tool_calls.push(ToolCall::new(id, name, args));
            }
        }

        let raw_reason = candidate["finishReason"].as_str();
        if content.is_empty() && tool_calls.is_empty() {
            if let Some(reason) = raw_reason.filter(|r| BLOCKING_FINISH_REASONS.contains(r)) {
                return Err(Error::assistant_with_context(
                    "response blocked by provider",
                    ErrorContext::new()
                        .with_field_path("candidates[0].finishReason")
                        .with_details(reason)
                        .with_source("gemini_driver"),
                ));
            }
        }
        let finish_reason = raw_reason.map(Self::normalize_finish_reason);

        let usage = body.get("usageMetadata").map(|u| UsageInfo {
            prompt_tokens: u["promptTokenCount"].as_u64().unwrap_or(0),
            completion_tokens: u["candidatesTokenCount"].as_u64().unwrap_or(0),
            total_tokens: u["totalTokenCount"].as_u64().unwrap_or(0),
        });

        Ok(DriverResponse {
            content,
            tool_calls,
            finish_reason,
            usage,
        })
    }
}
