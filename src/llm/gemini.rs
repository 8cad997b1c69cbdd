//! Gemini client implementation
//!
//! Async HTTP client for the Gemini `generateContent` API with function calling.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::{CityTimeError, Config, Message, Result, ToolCall, ToolDefinition};
use crate::llm::traits::{GenerateOptions, LLMProvider, LLMResponse, TokenUsage};

/// Gemini API client
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

/// generateContent request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

/// A turn in Gemini's format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

/// One part of a turn: text, a function call, or a function response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<FunctionResponse>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionResponse {
    name: String,
    response: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTool {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct FunctionDeclaration {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

/// generateContent response body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    model_version: Option<String>,
    #[serde(default)]
    prompt_feedback: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

/// Error envelope returned with non-2xx statuses
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

impl GeminiClient {
    /// Create a client from configuration. Fails if no API key is available.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.api_key()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.llm.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.llm.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Create a client with a custom base URL and key
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url,
            model.trim_start_matches("models/")
        )
    }

    /// Convert internal messages to a Gemini request
    fn build_request(
        messages: &[Message],
        tools: &[ToolDefinition],
        options: Option<GenerateOptions>,
    ) -> GenerateContentRequest {
        let mut system_parts: Vec<Part> = Vec::new();
        let mut contents: Vec<Content> = Vec::new();

        for msg in messages {
            match msg.role.as_str() {
                "system" => system_parts.push(Part::text(&msg.content)),
                "assistant" => {
                    let mut parts = Vec::new();
                    if !msg.content.is_empty() {
                        parts.push(Part::text(&msg.content));
                    }
                    for call in msg.tool_calls.iter().flatten() {
                        parts.push(Part {
                            function_call: Some(FunctionCall {
                                name: call.name.clone(),
                                args: call.arguments.clone(),
                            }),
                            ..Default::default()
                        });
                    }
                    contents.push(Content {
                        role: Some("model".to_string()),
                        parts,
                    });
                }
                "tool" => {
                    let part = Part {
                        function_response: Some(FunctionResponse {
                            name: msg.tool_name.clone().unwrap_or_default(),
                            response: Self::tool_response_value(&msg.content),
                        }),
                        ..Default::default()
                    };
                    // Answers to one batch of calls travel in a single turn
                    let merge = contents
                        .last()
                        .is_some_and(Self::is_function_response_turn);
                    if merge {
                        if let Some(last) = contents.last_mut() {
                            last.parts.push(part);
                        }
                    } else {
                        contents.push(Content {
                            role: Some("user".to_string()),
                            parts: vec![part],
                        });
                    }
                }
                _ => contents.push(Content {
                    role: Some("user".to_string()),
                    parts: vec![Part::text(&msg.content)],
                }),
            }
        }

        let system_instruction = if system_parts.is_empty() {
            None
        } else {
            Some(Content {
                role: None,
                parts: system_parts,
            })
        };

        let tools = if tools.is_empty() {
            Vec::new()
        } else {
            vec![GeminiTool {
                function_declarations: tools
                    .iter()
                    .map(|t| FunctionDeclaration {
                        name: t.function.name.clone(),
                        description: t.function.description.clone(),
                        parameters: t.function.parameters.clone(),
                    })
                    .collect(),
            }]
        };

        let generation_config = options.and_then(|opts| {
            if opts.temperature.is_none() && opts.max_tokens.is_none() {
                None
            } else {
                Some(GenerationConfig {
                    temperature: opts.temperature,
                    max_output_tokens: opts.max_tokens,
                })
            }
        });

        GenerateContentRequest {
            system_instruction,
            contents,
            tools,
            generation_config,
        }
    }

    fn is_function_response_turn(content: &Content) -> bool {
        content.role.as_deref() == Some("user")
            && !content.parts.is_empty()
            && content.parts.iter().all(|p| p.function_response.is_some())
    }

    /// functionResponse.response must be an object
    fn tool_response_value(content: &str) -> serde_json::Value {
        match serde_json::from_str::<serde_json::Value>(content) {
            Ok(value @ serde_json::Value::Object(_)) => value,
            Ok(other) => serde_json::json!({ "result": other }),
            Err(_) => serde_json::json!({ "result": content }),
        }
    }

    /// Convert a Gemini response to LLMResponse
    fn to_llm_response(response: GenerateContentResponse, model: &str) -> Result<LLMResponse> {
        let candidate = match response.candidates.into_iter().next() {
            Some(c) => c,
            None => {
                let reason = response
                    .prompt_feedback
                    .as_ref()
                    .and_then(|f| f.get("blockReason"))
                    .and_then(|r| r.as_str())
                    .unwrap_or("no candidates returned");
                return Err(CityTimeError::backend(None, format!("Empty response: {}", reason)));
            }
        };

        let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
        if parts.is_empty() {
            return Err(CityTimeError::backend(
                None,
                format!(
                    "Response had no content (finish reason: {})",
                    candidate.finish_reason.as_deref().unwrap_or("unknown")
                ),
            ));
        }

        let mut content = String::new();
        let mut tool_calls = Vec::new();
        for part in parts {
            if let Some(text) = part.text {
                content.push_str(&text);
            }
            if let Some(call) = part.function_call {
                tool_calls.push(ToolCall::new(call.name, call.args));
            }
        }

        let usage = response.usage_metadata.map(|u| TokenUsage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });

        Ok(LLMResponse {
            content,
            tool_calls,
            usage,
            model: response.model_version.unwrap_or_else(|| model.to_string()),
        })
    }

    /// Pull a readable message out of an error body
    fn error_message(body: &str) -> String {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => match envelope.error.status {
                Some(status) => format!("{}: {}", status, envelope.error.message),
                None => envelope.error.message,
            },
            Err(_) if body.trim().is_empty() => "no response body".to_string(),
            Err(_) => body.trim().to_string(),
        }
    }
}

/// Shorten a payload for debug logs
fn preview(content: &str) -> String {
    const LIMIT: usize = 500;
    if content.chars().count() > LIMIT {
        format!("{}...", content.chars().take(LIMIT).collect::<String>())
    } else {
        content.to_string()
    }
}

#[async_trait]
impl LLMProvider for GeminiClient {
    async fn chat_with_tools(
        &self,
        model: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        let request = Self::build_request(messages, tools, options);
        let request_json = serde_json::to_string(&request)?;
        tracing::debug!(model, request = %preview(&request_json), "gemini request");

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;
        tracing::debug!(status = status.as_u16(), response = %preview(&response_text), "gemini response");

        if !status.is_success() {
            return Err(CityTimeError::backend(
                Some(status.as_u16()),
                Self::error_message(&response_text),
            ));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&response_text)
            .map_err(|e| CityTimeError::backend(None, format!("Failed to parse response: {}", e)))?;

        let llm_response = Self::to_llm_response(parsed, model)?;
        if let Some(usage) = &llm_response.usage {
            tracing::debug!(
                prompt = usage.prompt_tokens,
                completion = usage.completion_tokens,
                "token usage"
            );
        }
        Ok(llm_response)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
