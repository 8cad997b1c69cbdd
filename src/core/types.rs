//! Shared types used across citytime modules
//!
//! Contains the LLM-facing message structures and tool definitions.

use serde::{Deserialize, Serialize};

/// A message sent to the LLM
///
/// Messages are built fresh for every backend call from the session
/// transcript plus whatever tool traffic the current turn produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender (system, user, assistant, tool)
    pub role: String,
    /// Content of the message
    pub content: String,
    /// Tool calls requested by the assistant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// Name of the tool whose result this message carries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
}

impl Message {
    fn with_role(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
            tool_calls: None,
            tool_name: None,
        }
    }

    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role("user", content)
    }

    /// Create a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role("assistant", content)
    }

    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role("system", content)
    }

    /// Create an assistant message that requests tool calls
    pub fn assistant_tool_calls(content: impl Into<String>, calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls: Some(calls),
            ..Self::with_role("assistant", content)
        }
    }

    /// Create a message carrying the output of a tool back to the model
    pub fn tool(tool_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_name: Some(tool_name.into()),
            ..Self::with_role("tool", content)
        }
    }
}

/// A tool call made by the LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to invoke
    pub name: String,
    /// JSON arguments for the tool
    pub arguments: serde_json::Value,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// Get a string argument by key
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.arguments
            .get(key)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }
}

/// Definition of a tool that can be called by the LLM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Type of tool (always "function" for now)
    #[serde(rename = "type")]
    pub tool_type: String,
    /// Function details
    pub function: FunctionDefinition,
}

/// Function definition within a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// Name of the function
    pub name: String,
    /// Description of what the function does
    pub description: String,
    /// JSON Schema for the parameters
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// Create a new function tool definition
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }

    /// Name of the underlying function
    pub fn name(&self) -> &str {
        &self.function.name
    }
}

/// Result of executing a tool
#[derive(Debug, Clone)]
pub struct ToolResult {
    /// Name of the tool that was executed
    pub tool_name: String,
    /// Whether the execution was successful
    pub success: bool,
    /// Output from the tool
    pub output: String,
    /// Optional structured data
    pub data: Option<serde_json::Value>,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(tool_name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: true,
            output: output.into(),
            data: None,
        }
    }

    /// Create a result with structured data; `success` mirrors the data's outcome
    pub fn with_data(
        tool_name: impl Into<String>,
        success: bool,
        output: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            success,
            output: output.into(),
            data: Some(data),
        }
    }

    /// Create a failed result
    pub fn failure(tool_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: false,
            output: error.into(),
            data: None,
        }
    }

    /// Render the result as the content of a `tool` message
    ///
    /// Structured data wins over the plain output so the model always reads
    /// the same JSON shape a direct lookup prints.
    pub fn to_message(&self) -> Message {
        let content = match &self.data {
            Some(data) => data.to_string(),
            None => serde_json::json!({
                "status": if self.success { "success" } else { "error" },
                "message": self.output,
            })
            .to_string(),
        };
        Message::tool(&self.tool_name, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_call_get_string() {
        let call = ToolCall::new("get_current_time", json!({"timezone": "Asia/Dubai"}));
        assert_eq!(call.get_string("timezone").as_deref(), Some("Asia/Dubai"));
        assert!(call.get_string("city").is_none());

        let call = ToolCall::new("get_current_time", json!({"timezone": 4}));
        assert!(call.get_string("timezone").is_none());
    }

    #[test]
    fn test_tool_result_message_prefers_data() {
        let result = ToolResult::with_data(
            "get_current_time",
            true,
            "ignored",
            json!({"status": "success", "timezone": "Asia/Dubai"}),
        );
        let msg = result.to_message();
        assert_eq!(msg.role, "tool");
        assert_eq!(msg.tool_name.as_deref(), Some("get_current_time"));
        let parsed: serde_json::Value = serde_json::from_str(&msg.content).unwrap();
        assert_eq!(parsed["timezone"], "Asia/Dubai");
    }

    #[test]
    fn test_failure_message_is_json() {
        let msg = ToolResult::failure("nope", "Unknown tool: nope").to_message();
        let parsed: serde_json::Value = serde_json::from_str(&msg.content).unwrap();
        assert_eq!(parsed["status"], "error");
        assert_eq!(parsed["message"], "Unknown tool: nope");
    }
}
