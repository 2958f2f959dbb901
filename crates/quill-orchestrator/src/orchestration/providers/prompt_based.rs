// Prompt-based reasoning provider
//
// Uses prompt engineering to enable tool calling for models that don't
// have native function calling support. The model is instructed to output
// JSON-formatted tool calls; an output that attempts a tool call but fails
// to parse is reported as a malformed call so the engine can recover.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Write;
use std::sync::Arc;

use crate::error::{GenerationError, Result};
use crate::orchestration::{
    FinishReason, OrchestrationProvider, OrchestrationResult,
    context::GenerationContext,
    tool::{Tool, ToolCall},
};
use quill_abstraction::{ChatMessage, Model};

/// Tool call request in JSON format
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ToolCallRequest {
    tool: String,
    arguments: Value,
}

/// Response format for prompt-based tool calling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum PromptResponse {
    ToolCalls { tool_calls: Vec<ToolCallRequest> },
    Text { response: String },
}

/// Prompt-based reasoning provider
pub struct PromptToolProvider {
    /// Underlying model to use
    model: Arc<dyn Model + Send + Sync>,
}

impl PromptToolProvider {
    /// Create a new prompt-based provider
    pub fn new(model: Arc<dyn Model + Send + Sync>) -> Self {
        Self { model }
    }

    /// Build system prompt with tool definitions
    fn build_system_prompt(tools: &[Tool]) -> String {
        let mut prompt = String::from(
            "You are an intelligent assistant that can use tools to help users.\n\n\
            When you need to use a tool, respond ONLY with a JSON object in this exact format:\n\
            {\"tool_calls\": [{\"tool\": \"tool_name\", \"arguments\": {\"arg1\": \"value1\"}}]}\n\n\
            When the task is complete, respond with the final answer as plain text.\n\n\
            Available tools:\n\n",
        );

        for tool in tools {
            let _ = write!(
                &mut prompt,
                "Tool: {}\nDescription: {}\nParameters: {}\n\n",
                tool.name,
                tool.description,
                serde_json::to_string_pretty(&tool.parameters).unwrap_or_default()
            );
        }

        prompt.push_str(
            "Remember:\n\
            - Respond with JSON tool_calls when using tools\n\
            - Respond with plain text otherwise\n\
            - Only use one tool call at a time for clarity",
        );

        prompt
    }

    /// Parse model response into tool calls or text.
    ///
    /// An output that looks like a tool-call attempt but is not valid JSON
    /// is an error so the caller can feed it back to the model.
    fn parse_response(response: &str) -> std::result::Result<PromptResponse, String> {
        if let Ok(parsed) = serde_json::from_str::<PromptResponse>(response) {
            return Ok(parsed);
        }

        let trimmed = response.trim();
        if trimmed.starts_with('{') && trimmed.contains("tool_calls") {
            let preview: String = trimmed.chars().take(120).collect();
            return Err(format!("response attempts a tool call but is not valid JSON: {preview}"));
        }

        // Not JSON at all: treat as a plain text answer
        Ok(PromptResponse::Text { response: response.to_string() })
    }

    /// Convert tool call requests to ToolCall format
    fn convert_tool_calls(requests: Vec<ToolCallRequest>) -> Vec<ToolCall> {
        requests
            .into_iter()
            .enumerate()
            .map(|(i, req)| ToolCall {
                id: format!("call_{}", i),
                name: req.tool,
                arguments: req.arguments,
            })
            .collect()
    }
}

#[async_trait]
impl OrchestrationProvider for PromptToolProvider {
    async fn execute_with_tools(
        &self,
        input: &str,
        tools: &[Tool],
        context: &GenerationContext,
    ) -> Result<OrchestrationResult> {
        // Build system prompt with tool definitions
        let system_prompt = Self::build_system_prompt(tools);

        // Build message history
        let mut messages = vec![ChatMessage::system(system_prompt)];

        for msg in &context.conversation_history {
            messages.push(ChatMessage { role: msg.role.clone(), content: msg.content.clone() });
        }

        messages.push(ChatMessage::user(input));

        let response = self
            .model
            .generate_chat_completion(&messages, Some(context.parameters.clone()))
            .await
            .map_err(GenerationError::Model)?;

        match Self::parse_response(&response.content) {
            Ok(PromptResponse::ToolCalls { tool_calls }) => {
                let converted = Self::convert_tool_calls(tool_calls);
                Ok(OrchestrationResult::new(String::new(), converted, FinishReason::Stop))
            }
            Ok(PromptResponse::Text { response: text }) => {
                Ok(OrchestrationResult::new(text, vec![], FinishReason::Stop))
            }
            Err(reason) => Err(GenerationError::MalformedToolCall(reason)),
        }
    }

    fn supports_function_calling(&self) -> bool {
        false
    }

    fn provider_name(&self) -> &'static str {
        "prompt_based"
    }
}
