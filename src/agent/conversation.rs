//! The two-state conversation loop.

use super::{AssistantStep, ConversationState};
use crate::checkpoint::CheckpointStore;
use crate::error::{Error, ProtocolError};
use crate::tools::FallbackExecutor;
use crate::types::{Message, ToolCall};
use crate::Result;
use std::sync::Arc;
use tracing::{debug, info};

/// Where the loop is between steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Assistant,
    Tools,
    Done,
}

/// Alternates assistant and tool steps until the assistant answers without
/// requesting tools.
///
/// Tool failures never end a run; they reach the assistant as error results.
/// Only an assistant-step failure, a transcript protocol violation or the
/// recursion limit abort it.
pub struct ConversationLoop {
    assistant: Arc<dyn AssistantStep>,
    executor: FallbackExecutor,
    checkpoints: Arc<dyn CheckpointStore>,
    recursion_limit: usize,
}

impl ConversationLoop {
    pub fn new(
        assistant: Arc<dyn AssistantStep>,
        executor: FallbackExecutor,
        checkpoints: Arc<dyn CheckpointStore>,
        recursion_limit: usize,
    ) -> Self {
        Self {
            assistant,
            executor,
            checkpoints,
            recursion_limit: recursion_limit.max(1),
        }
    }

    pub fn executor(&self) -> &FallbackExecutor {
        &self.executor
    }

    pub fn checkpoints(&self) -> &Arc<dyn CheckpointStore> {
        &self.checkpoints
    }

    /// Start a fresh conversation from one user message.
    pub async fn run(&self, input: impl Into<String>) -> Result<ConversationState> {
        let mut state = ConversationState::new();
        state.push(Message::user(input))?;
        self.drive(state, LoopState::Assistant).await
    }

    /// Continue an existing transcript.
    ///
    /// Tool calls still awaiting a result are executed first; otherwise the
    /// run starts at the assistant step.
    pub async fn resume(&self, state: ConversationState) -> Result<ConversationState> {
        if state.is_empty() {
            return Err(ProtocolError::EmptyTranscript.into());
        }
        let start = if state.pending_tool_calls().is_empty() {
            LoopState::Assistant
        } else {
            LoopState::Tools
        };
        self.drive(state, start).await
    }

    /// Restore the session's checkpoint, append `input`, run to completion and
    /// checkpoint the result.
    ///
    /// A failed run leaves the previous checkpoint untouched.
    pub async fn run_session(
        &self,
        session_id: &str,
        input: impl Into<String>,
    ) -> Result<ConversationState> {
        let mut state = self
            .checkpoints
            .get(session_id)
            .await?
            .unwrap_or_default();
        debug!(session_id, restored = state.len(), "session restored");

        state.push(Message::user(input))?;
        let state = self.drive(state, LoopState::Assistant).await?;
        self.checkpoints.put(session_id, &state).await?;
        Ok(state)
    }

    /// Drop a session's checkpoint.
    pub async fn reset_session(&self, session_id: &str) -> Result<bool> {
        self.checkpoints.delete(session_id).await
    }

    async fn drive(
        &self,
        mut state: ConversationState,
        mut step: LoopState,
    ) -> Result<ConversationState> {
        let mut assistant_steps = 0usize;

        loop {
            step = match step {
                LoopState::Assistant => {
                    if assistant_steps >= self.recursion_limit {
                        return Err(Error::RecursionLimit {
                            limit: self.recursion_limit,
                        });
                    }
                    assistant_steps += 1;

                    info!(step = assistant_steps, "assistant node invoked");
                    let reply = self.assistant.respond(&state).await?;
                    let next = if reply.tool_calls.is_empty() {
                        LoopState::Done
                    } else {
                        LoopState::Tools
                    };
                    state.push(reply.into())?;
                    next
                }
                LoopState::Tools => {
                    let calls: Vec<ToolCall> =
                        state.pending_tool_calls().into_iter().cloned().collect();
                    info!(count = calls.len(), "dispatching tool calls");

                    for result in self.executor.execute_all(&calls).await {
                        state.push(result.into())?;
                    }
                    LoopState::Assistant
                }
                LoopState::Done => {
                    info!(messages = state.len(), "conversation turn complete");
                    return Ok(state);
                }
            };
        }
    }
}

impl std::fmt::Debug for ConversationLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationLoop")
            .field("executor", &self.executor)
            .field("checkpoints", &self.checkpoints.name())
            .field("recursion_limit", &self.recursion_limit)
            .finish()
    }
}
