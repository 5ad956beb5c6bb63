//! Tool registry.

use super::{Tool, ToolError};
use crate::types::ToolDefinition;
use serde_json::Value;
use std::sync::Arc;

/// Tools available to the conversation, kept in registration order.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Registry holding only the `calculate_health_metrics` tool.
    pub fn with_health_tools() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(super::CalculateHealthMetricsTool));
        registry
    }

    /// Register a tool. A tool with the same name replaces the earlier one in place.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        match self.tools.iter().position(|t| t.name() == tool.name()) {
            Some(idx) => self.tools[idx] = tool,
            None => self.tools.push(tool),
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Look up `name` and invoke it.
    pub async fn call(&self, name: &str, arguments: Value) -> Result<Value, ToolError> {
        let tool = self.get(name).ok_or_else(|| ToolError::UnknownTool {
            name: name.to_string(),
            available: self.names().join(", "),
        })?;
        tool.call(arguments).await
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_unknown_tool() {
        let registry = ToolRegistry::with_health_tools();
        let err = registry.call("tavily_search", json!({})).await.unwrap_err();
        match err {
            ToolError::UnknownTool { name, available } => {
                assert_eq!(name, "tavily_search");
                assert_eq!(available, "calculate_health_metrics");
            }
            other => panic!("expected UnknownTool, got {other:?}"),
        }
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = ToolRegistry::with_health_tools();
        registry.register(Arc::new(crate::tools::CalculateHealthMetricsTool));
        assert_eq!(registry.len(), 1);
        assert!(registry.has("calculate_health_metrics"));
        assert_eq!(registry.definitions()[0].name(), "calculate_health_metrics");
    }
}
