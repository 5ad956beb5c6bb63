use super::{AssistantStep, ConversationLoop, HttpAssistant};
use crate::checkpoint::{CheckpointStore, MemoryCheckpointStore};
use crate::config::AgentConfig;
use crate::error::{Error, ErrorContext};
use crate::tools::{FallbackExecutor, Tool, ToolRegistry};
use crate::Result;
use std::sync::Arc;

/// Builder for a [`ConversationLoop`].
///
/// Without an explicit assistant, `build` creates an [`HttpAssistant`] from
/// the configuration, bound to the registry's tool definitions.
pub struct AgentBuilder {
    config: AgentConfig,
    assistant: Option<Arc<dyn AssistantStep>>,
    registry: ToolRegistry,
    checkpoints: Option<Arc<dyn CheckpointStore>>,
    recursion_limit: Option<usize>,
    parallel_tool_calls: Option<bool>,
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            config: AgentConfig::default(),
            assistant: None,
            registry: ToolRegistry::with_health_tools(),
            checkpoints: None,
            recursion_limit: None,
            parallel_tool_calls: None,
        }
    }

    pub fn config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    /// Override the base URL (primarily for testing with mock servers).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = Some(base_url.into());
        self
    }

    /// Inject the assistant step, bypassing the HTTP assistant.
    pub fn assistant(mut self, assistant: Arc<dyn AssistantStep>) -> Self {
        self.assistant = Some(assistant);
        self
    }

    /// Register an extra tool. A tool with the same name is replaced.
    pub fn tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.registry.register(tool);
        self
    }

    /// Replace the whole tool registry.
    pub fn tools(mut self, registry: ToolRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Defaults to an unbounded in-memory store.
    pub fn checkpoint_store(mut self, store: Arc<dyn CheckpointStore>) -> Self {
        self.checkpoints = Some(store);
        self
    }

    pub fn recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = Some(limit);
        self
    }

    pub fn parallel_tool_calls(mut self, enable: bool) -> Self {
        self.parallel_tool_calls = Some(enable);
        self
    }

    pub fn build(self) -> Result<ConversationLoop> {
        let recursion_limit = self.recursion_limit.unwrap_or(self.config.recursion_limit);
        if recursion_limit == 0 {
            return Err(Error::configuration_with_context(
                "recursion_limit must be at least 1",
                ErrorContext::new()
                    .with_field_path("recursion_limit")
                    .with_source("agent_builder"),
            ));
        }

        let assistant = match self.assistant {
            Some(assistant) => assistant,
            None => Arc::new(HttpAssistant::from_config(
                &self.config,
                self.registry.definitions(),
            )?) as Arc<dyn AssistantStep>,
        };

        let parallel = self
            .parallel_tool_calls
            .unwrap_or(self.config.parallel_tool_calls);
        let executor = FallbackExecutor::new(self.registry).parallel(parallel);
        let checkpoints = self
            .checkpoints
            .unwrap_or_else(|| Arc::new(MemoryCheckpointStore::new()));

        Ok(ConversationLoop::new(
            assistant,
            executor,
            checkpoints,
            recursion_limit,
        ))
    }
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}
