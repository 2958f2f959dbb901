// OpenAI reasoning provider using the function calling API
//
// Exposes the stage capabilities as OpenAI function declarations and lets
// the model decide which to invoke each turn.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GenerationError, Result};
use crate::orchestration::{
    FinishReason, OrchestrationProvider, OrchestrationResult,
    context::GenerationContext,
    tool::{Tool, ToolCall},
};
use quill_abstraction::ModelError;

/// OpenAI function definition
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAIFunction {
    name: String,
    description: String,
    parameters: Value,
}

/// OpenAI tool definition
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAITool {
    #[serde(rename = "type")]
    tool_type: String,
    function: OpenAIFunction,
}

/// OpenAI function call
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAIFunctionCall {
    name: String,
    arguments: String,
}

/// OpenAI tool call
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAIToolCall {
    id: String,
    #[serde(rename = "type")]
    call_type: String,
    function: OpenAIFunctionCall,
}

/// OpenAI message
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAIToolCall>>,
}

/// OpenAI API request
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAITool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// OpenAI choice
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
    finish_reason: Option<String>,
}

/// OpenAI API response
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

/// OpenAI function-calling provider
pub struct OpenAIToolProvider {
    /// Model ID to use
    model_id: String,
    /// API key for authentication
    api_key: String,
    /// HTTP client
    client: Client,
    /// Base URL
    base_url: String,
}

impl OpenAIToolProvider {
    /// Create a new OpenAI provider
    pub fn new(model_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            api_key: api_key.into(),
            client: Client::new(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    /// Overrides the API base URL (OpenAI-compatible endpoints, tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Convert capabilities to OpenAI function declarations
    fn tools_to_openai(tools: &[Tool]) -> Vec<OpenAITool> {
        tools
            .iter()
            .map(|tool| OpenAITool {
                tool_type: "function".to_string(),
                function: OpenAIFunction {
                    name: tool.name.clone(),
                    description: tool.description.clone(),
                    parameters: serde_json::to_value(&tool.parameters).unwrap_or(Value::Null),
                },
            })
            .collect()
    }

    /// Parse tool calls from an OpenAI response.
    ///
    /// # Errors
    /// `GenerationError::MalformedToolCall` when the argument payload is
    /// not valid JSON; the engine recovers from this locally.
    fn parse_tool_calls(tool_calls: &[OpenAIToolCall]) -> Result<Vec<ToolCall>> {
        tool_calls
            .iter()
            .map(|tc| {
                let arguments: Value =
                    serde_json::from_str(&tc.function.arguments).map_err(|e| {
                        GenerationError::MalformedToolCall(format!(
                            "arguments for '{}' are not valid JSON: {e}",
                            tc.function.name
                        ))
                    })?;

                Ok(ToolCall { id: tc.id.clone(), name: tc.function.name.clone(), arguments })
            })
            .collect()
    }

    /// Make API call to OpenAI
    async fn call_openai(&self, request: &OpenAIRequest) -> Result<OpenAIResponse> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                GenerationError::Model(ModelError::RequestError(format!("Network error: {}", e)))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            if status == 402 || status == 429 {
                return Err(GenerationError::Model(ModelError::QuotaExceeded {
                    provider: "openai".to_string(),
                    message: Some(error_text),
                }));
            }
            return Err(GenerationError::Model(ModelError::ModelResponseError(format!(
                "API error ({}): {}",
                status, error_text
            ))));
        }

        let openai_response: OpenAIResponse = response.json().await.map_err(|e| {
            GenerationError::Model(ModelError::SerializationError(format!(
                "Failed to parse response: {}",
                e
            )))
        })?;

        Ok(openai_response)
    }
}

#[async_trait]
impl OrchestrationProvider for OpenAIToolProvider {
    async fn execute_with_tools(
        &self,
        input: &str,
        tools: &[Tool],
        context: &GenerationContext,
    ) -> Result<OrchestrationResult> {
        let openai_tools = Self::tools_to_openai(tools);
        let tools_opt = if openai_tools.is_empty() { None } else { Some(openai_tools) };

        // Build message history
        let mut messages = Vec::new();

        for msg in &context.conversation_history {
            messages.push(OpenAIMessage {
                role: msg.role.clone(),
                content: Some(msg.content.clone()),
                tool_calls: None,
            });
        }

        messages.push(OpenAIMessage {
            role: "user".to_string(),
            content: Some(input.to_string()),
            tool_calls: None,
        });

        let request = OpenAIRequest {
            model: self.model_id.clone(),
            messages,
            tools: tools_opt,
            temperature: context.parameters.temperature,
        };

        let response = self.call_openai(&request).await?;

        let choice = response.choices.first().ok_or_else(|| {
            GenerationError::Model(ModelError::ModelResponseError(
                "No choices in response".to_string(),
            ))
        })?;

        let tool_calls = if let Some(ref tc) = choice.message.tool_calls {
            Self::parse_tool_calls(tc)?
        } else {
            vec![]
        };

        let text_response = choice.message.content.clone().unwrap_or_default();

        if !tool_calls.is_empty() {
            return Ok(OrchestrationResult::new(text_response, tool_calls, FinishReason::Stop));
        }

        Ok(OrchestrationResult::new(text_response, vec![], FinishReason::Stop))
    }

    fn supports_function_calling(&self) -> bool {
        true
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}
