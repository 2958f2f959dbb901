// Orchestration module for the linear strategy
//
// Provides the capability (tool) abstractions, conversation context, the
// reasoning-provider trait, and the multi-turn engine that drives the
// outline -> draft -> SEO process through tool calls.

pub mod context;
pub mod engine;
pub mod providers;
pub mod stage_tools;
pub mod tool;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use self::context::GenerationContext;
use self::tool::{Tool, ToolCall};
use crate::error::Result;

/// Reasons why an orchestration loop finished
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum FinishReason {
    /// The reasoning loop declared the task complete
    Stop,
    /// Reached maximum tool iterations
    MaxIterations,
    /// Model or engine error
    Error,
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stop => write!(f, "stop"),
            Self::MaxIterations => write!(f, "max_iterations"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Result of one reasoning turn, or of the whole loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationResult {
    /// Text response from the reasoning step
    pub response: String,
    /// Tool calls requested by the reasoning step
    pub tool_calls: Vec<ToolCall>,
    /// Reason the turn/loop finished
    pub finish_reason: FinishReason,
}

impl OrchestrationResult {
    /// Create a new orchestration result
    pub fn new(response: String, tool_calls: Vec<ToolCall>, finish_reason: FinishReason) -> Self {
        Self { response, tool_calls, finish_reason }
    }

    /// Check if orchestration completed successfully
    pub fn is_success(&self) -> bool {
        matches!(self.finish_reason, FinishReason::Stop)
    }

    /// Check if there are tool calls to execute
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Model-agnostic reasoning provider trait
///
/// Implementations decide, for one turn, whether to invoke a capability or
/// to declare the task finished with a final text answer.
#[async_trait]
pub trait OrchestrationProvider: Send + Sync {
    /// Execute one reasoning turn with the available capabilities.
    ///
    /// # Arguments
    /// * `input` - Input for this turn (instruction or prior tool output)
    /// * `tools` - Capabilities the provider can invoke
    /// * `context` - Conversation history and run parameters
    ///
    /// # Errors
    /// `GenerationError::MalformedToolCall` when the reasoning output could
    /// not be parsed into tool calls (recoverable by the engine); any other
    /// error aborts the run.
    async fn execute_with_tools(
        &self,
        input: &str,
        tools: &[Tool],
        context: &GenerationContext,
    ) -> Result<OrchestrationResult>;

    /// Check if provider supports native function calling
    fn supports_function_calling(&self) -> bool;

    /// Get provider name for logging/debugging
    fn provider_name(&self) -> &'static str;
}
