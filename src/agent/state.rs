//! Append-only conversation transcript.

use crate::error::ProtocolError;
use crate::types::{Message, MessageRole, ToolCall};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ordered transcript of one conversation.
///
/// Messages can only be appended. Every append re-checks the tool call
/// invariants: request ids are unique, and each tool result answers exactly
/// one earlier request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Message>", into = "Vec<Message>")]
pub struct ConversationState {
    messages: Vec<Message>,
    #[serde(skip)]
    requested: HashSet<String>,
    #[serde(skip)]
    answered: HashSet<String>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a state from raw messages, checking every invariant.
    pub fn from_messages(messages: Vec<Message>) -> Result<Self, ProtocolError> {
        let mut state = Self::new();
        for message in messages {
            state.push(message)?;
        }
        Ok(state)
    }

    pub fn push(&mut self, message: Message) -> Result<(), ProtocolError> {
        match &message {
            Message::Assistant { tool_calls, .. } => {
                let mut batch = HashSet::new();
                for call in tool_calls {
                    if self.requested.contains(&call.id) || !batch.insert(call.id.as_str()) {
                        return Err(ProtocolError::DuplicateToolCallId {
                            tool_call_id: call.id.clone(),
                        });
                    }
                }
                self.requested.extend(tool_calls.iter().map(|c| c.id.clone()));
            }
            Message::ToolResult { tool_call_id, .. } => {
                if !self.requested.contains(tool_call_id) {
                    return Err(ProtocolError::UnknownToolCallId {
                        tool_call_id: tool_call_id.clone(),
                    });
                }
                if !self.answered.insert(tool_call_id.clone()) {
                    return Err(ProtocolError::DuplicateToolResult {
                        tool_call_id: tool_call_id.clone(),
                    });
                }
            }
            Message::User { .. } => {}
        }
        self.messages.push(message);
        Ok(())
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Tool calls that have been requested but not answered yet, in request order.
    pub fn pending_tool_calls(&self) -> Vec<&ToolCall> {
        self.messages
            .iter()
            .flat_map(|m| m.tool_calls())
            .filter(|c| !self.answered.contains(&c.id))
            .collect()
    }

    /// Text of the most recent assistant message without tool calls.
    pub fn final_answer(&self) -> Option<&str> {
        match self.messages.last() {
            Some(msg) if msg.role() == MessageRole::Assistant && !msg.has_tool_calls() => {
                Some(msg.text())
            }
            _ => None,
        }
    }

    /// Name of the tool a call id was issued for.
    pub fn tool_name_for(&self, tool_call_id: &str) -> Option<&str> {
        self.messages
            .iter()
            .flat_map(|m| m.tool_calls())
            .find(|c| c.id == tool_call_id)
            .map(|c| c.name.as_str())
    }
}

impl TryFrom<Vec<Message>> for ConversationState {
    type Error = ProtocolError;

    fn try_from(messages: Vec<Message>) -> Result<Self, Self::Error> {
        Self::from_messages(messages)
    }
}

impl From<ConversationState> for Vec<Message> {
    fn from(state: ConversationState) -> Self {
        state.messages
    }
}
