//! Tool registry - manages and dispatches tool calls
//!
//! Central hub for registering tools and routing tool calls to handlers.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::{ToolCall, ToolDefinition, ToolResult};

/// A capability the model may invoke: a name, a parameter schema, a handler
#[async_trait]
pub trait Tool: Send + Sync {
    /// Declared name and JSON schema
    fn definition(&self) -> ToolDefinition;

    /// Run the tool. Failures are reported in the result, not as errors.
    async fn call(&self, tool_call: &ToolCall) -> ToolResult;
}

/// Registry of available tools
#[derive(Default, Clone)]
pub struct ToolRegistry {
    /// Tools indexed by name; ordered so definitions are sent deterministically
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any previous tool with the same name
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.definition().name().to_string();
        self.tools.insert(name, tool);
    }

    /// Builder-style [`register`](Self::register)
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    /// Get all tool definitions
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition()).collect()
    }

    /// Names of registered tools
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool call
    pub async fn execute(&self, tool_call: &ToolCall) -> ToolResult {
        match self.tools.get(&tool_call.name) {
            Some(tool) => {
                tracing::debug!(tool = %tool_call.name, args = %tool_call.arguments, "dispatching tool");
                tool.call(tool_call).await
            }
            None => {
                tracing::warn!(tool = %tool_call.name, "model requested unknown tool");
                ToolResult::failure(
                    &tool_call.name,
                    format!("Unknown tool: {}", tool_call.name),
                )
            }
        }
    }
}
