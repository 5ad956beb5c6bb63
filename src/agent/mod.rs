//! Conversation loop: transcript state, the assistant step and the driver
//! that alternates it with tool execution.

mod assistant;
mod builder;
mod conversation;
mod state;

pub use assistant::{AssistantReply, AssistantStep, HttpAssistant};
pub use builder::AgentBuilder;
pub use conversation::{ConversationLoop, LoopState};
pub use state::ConversationState;
