//! Shared fixtures for the conversation tests.

#![allow(dead_code)]

use async_trait::async_trait;
use health_metrics_agent::{
    AssistantReply, AssistantStep, ConversationState, Error, ErrorContext, ToolCall,
};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Assistant step that replays a fixed script and records every transcript
/// it was shown.
#[derive(Default)]
pub struct ScriptedAssistant {
    replies: Mutex<VecDeque<health_metrics_agent::Result<AssistantReply>>>,
    seen: Mutex<Vec<ConversationState>>,
}

impl ScriptedAssistant {
    pub fn new(replies: Vec<health_metrics_agent::Result<AssistantReply>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(replies: Vec<AssistantReply>) -> Self {
        Self::new(replies.into_iter().map(Ok).collect())
    }

    pub fn seen(&self) -> Vec<ConversationState> {
        self.seen.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl AssistantStep for ScriptedAssistant {
    async fn respond(&self, state: &ConversationState) -> health_metrics_agent::Result<AssistantReply> {
        self.seen.lock().unwrap().push(state.clone());
        self.replies.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(Error::assistant_with_context(
                "script exhausted",
                ErrorContext::new().with_source("scripted_assistant"),
            ))
        })
    }
}

/// Assistant step that never stops asking for tools.
#[derive(Default)]
pub struct LoopingAssistant {
    calls: AtomicUsize,
}

impl LoopingAssistant {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssistantStep for LoopingAssistant {
    async fn respond(&self, _state: &ConversationState) -> health_metrics_agent::Result<AssistantReply> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(AssistantReply::tool_calls(
            "",
            vec![metrics_call(&format!("loop_{n}"), 70.0)],
        ))
    }
}

pub fn metrics_args(weight_kg: f64) -> Value {
    json!({
        "weight_kg": weight_kg,
        "height_cm": 170,
        "age": 30,
        "gender": "male",
        "activity_level": "moderate"
    })
}

pub fn metrics_call(id: &str, weight_kg: f64) -> ToolCall {
    ToolCall::new(id, "calculate_health_metrics", metrics_args(weight_kg))
}
