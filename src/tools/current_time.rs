//! `get_current_time` - exposes a [`TimeResolver`] to the model

use async_trait::async_trait;
use std::sync::Arc;

use crate::core::{ToolCall, ToolDefinition, ToolResult};
use crate::time::TimeResolver;
use crate::tools::registry::Tool;

pub const TOOL_NAME: &str = "get_current_time";

/// Tool wrapping a time resolver
pub struct CurrentTimeTool {
    resolver: Arc<dyn TimeResolver>,
}

impl CurrentTimeTool {
    pub fn new(resolver: Arc<dyn TimeResolver>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl Tool for CurrentTimeTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(
            TOOL_NAME,
            "Returns the current time and date for a given IANA timezone.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "timezone": {
                        "type": "string",
                        "description": "Full IANA timezone identifier, e.g. Asia/Dubai, Europe/Paris, America/New_York"
                    }
                },
                "required": ["timezone"]
            }),
        )
    }

    async fn call(&self, tool_call: &ToolCall) -> ToolResult {
        let Some(timezone) = tool_call.get_string("timezone") else {
            return ToolResult::failure(
                TOOL_NAME,
                "Missing required string argument 'timezone'",
            );
        };

        let lookup = self.resolver.resolve(&timezone).await;
        tracing::info!(
            timezone = %timezone,
            success = lookup.is_success(),
            "{}",
            lookup.summary()
        );

        ToolResult::with_data(
            TOOL_NAME,
            lookup.is_success(),
            lookup.summary(),
            lookup.to_json(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::{LocalResolver, TimeLookup};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn tool() -> CurrentTimeTool {
        CurrentTimeTool::new(Arc::new(LocalResolver::with_clock(|| {
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
        })))
    }

    #[test]
    fn test_schema_requires_timezone() {
        let def = tool().definition();
        assert_eq!(def.name(), TOOL_NAME);
        assert_eq!(def.function.parameters["required"], json!(["timezone"]));
        assert_eq!(
            def.function.parameters["properties"]["timezone"]["type"],
            "string"
        );
    }

    #[tokio::test]
    async fn test_success_carries_lookup_json() {
        let result = tool()
            .call(&ToolCall::new(TOOL_NAME, json!({"timezone": "Europe/Paris"})))
            .await;
        assert!(result.success);

        let lookup: TimeLookup = serde_json::from_value(result.data.unwrap()).unwrap();
        match lookup {
            TimeLookup::Success(fact) => {
                assert_eq!(fact.timezone, "Europe/Paris");
                assert_eq!(fact.current_time, "02:00 PM");
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_timezone_is_failure_with_data() {
        let result = tool()
            .call(&ToolCall::new(TOOL_NAME, json!({"timezone": "Mars/Phobos"})))
            .await;
        assert!(!result.success);
        assert_eq!(result.data.unwrap()["kind"], "unknown_timezone");
    }

    #[tokio::test]
    async fn test_missing_argument() {
        let result = tool()
            .call(&ToolCall::new(TOOL_NAME, json!({"city": "Dubai"})))
            .await;
        assert!(!result.success);
        assert!(result.data.is_none());
        assert!(result.output.contains("timezone"));
    }
}
