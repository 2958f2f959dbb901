// Multi-turn engine for the linear strategy
//
// Coordinates the reasoning provider and capability execution, handling the
// full loop of: input -> provider decision -> capability execution ->
// result feedback -> repeat until the provider declares a final answer.
//
// Recovery contract: a malformed reasoning output or an invalid capability
// invocation fails only that turn/call; the failure text is appended to the
// conversation and the loop continues. A genuine model or transport error
// aborts the run.

use tokio::time::{Duration, timeout};
use tracing::{debug, warn};

use super::{
    FinishReason, OrchestrationProvider, OrchestrationResult,
    context::{GenerationContext, Message},
    tool::{Tool, ToolResult},
};
use crate::error::{GenerationError, Result};
use std::sync::Arc;

/// Configuration for the linear engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum number of reasoning iterations
    pub max_iterations: usize,
    /// Maximum time (in seconds) for the entire run
    pub timeout_seconds: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        // Three stages plus reasoning turns, with headroom for one
        // recovered slip.
        Self { max_iterations: 8, timeout_seconds: 300 }
    }
}

/// Engine driving the reasoning loop over the stage capabilities
pub struct LinearEngine {
    /// Provider for reasoning decisions
    provider: Arc<dyn OrchestrationProvider>,
    /// Available capabilities
    tools: Vec<Tool>,
    /// Engine configuration
    config: EngineConfig,
}

impl LinearEngine {
    /// Create a new engine
    pub fn new(
        provider: Arc<dyn OrchestrationProvider>,
        tools: Vec<Tool>,
        config: EngineConfig,
    ) -> Self {
        Self { provider, tools, config }
    }

    /// Create an engine with default configuration
    pub fn with_defaults(provider: Arc<dyn OrchestrationProvider>, tools: Vec<Tool>) -> Self {
        Self::new(provider, tools, EngineConfig::default())
    }

    /// Execute the multi-turn loop until a final answer or budget exhaustion.
    ///
    /// The execution is wrapped in a wall-clock timeout.
    ///
    /// # Errors
    /// Returns any model/transport error unmodified; a timeout surfaces as
    /// `GenerationError::Other`.
    pub async fn execute(
        &self,
        input: &str,
        context: &mut GenerationContext,
    ) -> Result<OrchestrationResult> {
        let timeout_duration = Duration::from_secs(self.config.timeout_seconds);

        match timeout(timeout_duration, self.execute_internal(input, context)).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Other(format!(
                "generation timed out after {} seconds",
                self.config.timeout_seconds
            ))),
        }
    }

    /// Internal execution logic (without timeout wrapper)
    async fn execute_internal(
        &self,
        input: &str,
        context: &mut GenerationContext,
    ) -> Result<OrchestrationResult> {
        let mut iterations = 0;
        let mut current_input = input.to_string();

        loop {
            if iterations >= self.config.max_iterations {
                warn!(
                    run_id = %context.run_id,
                    iterations,
                    "reasoning loop reached its iteration budget"
                );
                return Ok(OrchestrationResult::new(
                    format!(
                        "Reached maximum iterations ({}) without a final answer",
                        self.config.max_iterations
                    ),
                    vec![],
                    FinishReason::MaxIterations,
                ));
            }

            // Get the next decision from the provider
            let decision = match self
                .provider
                .execute_with_tools(&current_input, &self.tools, context)
                .await
            {
                Ok(decision) => decision,
                Err(GenerationError::MalformedToolCall(reason)) => {
                    // Recoverable: the reasoning output was not parseable.
                    // Feed the error back as context and continue.
                    warn!(
                        run_id = %context.run_id,
                        %reason,
                        "malformed reasoning output, continuing with error as context"
                    );
                    let feedback = format!(
                        "Your previous tool call was malformed: {reason}. Respond again with a \
                         valid JSON tool call, or with the final answer as plain text."
                    );
                    context.add_message(Message::tool(feedback.clone()));
                    current_input = feedback;
                    iterations += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            // If no tool calls, the provider declared the task finished
            if decision.tool_calls.is_empty() {
                if !decision.response.is_empty() {
                    context.add_assistant_message(&decision.response);
                }
                debug!(
                    run_id = %context.run_id,
                    iterations,
                    finish_reason = %decision.finish_reason,
                    "reasoning loop finished"
                );
                return Ok(decision);
            }

            if !decision.response.is_empty() {
                context.add_assistant_message(&decision.response);
            }

            // Execute the requested capabilities; invalid invocations fail
            // softly and become context for the next turn
            let mut outputs = Vec::with_capacity(decision.tool_calls.len());
            for call in &decision.tool_calls {
                let result = match self.tools.iter().find(|t| t.name == call.name) {
                    Some(tool) => tool.execute(&call.arguments).await?,
                    None => {
                        let available: Vec<&str> =
                            self.tools.iter().map(|t| t.name.as_str()).collect();
                        ToolResult::error(format!(
                            "Tool '{}' not found. Available tools: {}",
                            call.name,
                            available.join(", ")
                        ))
                    }
                };

                let message = if result.success {
                    format!("Tool '{}' returned: {}", call.name, result.output)
                } else {
                    warn!(
                        run_id = %context.run_id,
                        tool = %call.name,
                        reason = %result.output,
                        "capability invocation failed, continuing"
                    );
                    format!("Tool '{}' failed: {}", call.name, result.output)
                };
                context.add_tool_message(&message);
                outputs.push(message);
            }

            // Prepare next iteration input from this round's results
            current_input = outputs.join("\n");
            iterations += 1;
        }
    }

    /// Get provider name
    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    /// Get number of available capabilities
    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestration::tool::{ToolArguments, ToolCall, ToolHandler, ToolParameters};
    use async_trait::async_trait;
    use quill_abstraction::ModelParameters;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // Scripted provider: returns each step once, in order. A step is either
    // a decision or a malformed-output error.
    struct ScriptedProvider {
        steps: Vec<std::result::Result<OrchestrationResult, String>>,
        call_count: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new(steps: Vec<std::result::Result<OrchestrationResult, String>>) -> Self {
            Self { steps, call_count: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl OrchestrationProvider for ScriptedProvider {
        async fn execute_with_tools(
            &self,
            _input: &str,
            _tools: &[Tool],
            _context: &GenerationContext,
        ) -> Result<OrchestrationResult> {
            let index = self.call_count.fetch_add(1, Ordering::SeqCst);
            match self.steps.get(index) {
                Some(Ok(decision)) => Ok(decision.clone()),
                Some(Err(reason)) => Err(GenerationError::MalformedToolCall(reason.clone())),
                None => Ok(OrchestrationResult::new(
                    "Done".to_string(),
                    vec![],
                    FinishReason::Stop,
                )),
            }
        }

        fn supports_function_calling(&self) -> bool {
            false
        }

        fn provider_name(&self) -> &'static str {
            "scripted"
        }
    }

    struct EchoHandler;

    #[async_trait]
    impl ToolHandler for EchoHandler {
        async fn execute(&self, args: &ToolArguments) -> Result<ToolResult> {
            let topic = args.get_string("topic").unwrap_or_else(|| "unknown".to_string());
            Ok(ToolResult::success(format!("outline for {}", topic)))
        }
    }

    fn outline_tool() -> Tool {
        Tool::new(
            "outline_generator",
            "Creates content outlines",
            ToolParameters::new().add_property("topic", "string", "Blog topic", true),
            Arc::new(EchoHandler),
        )
    }

    fn call(name: &str, arguments: serde_json::Value) -> ToolCall {
        ToolCall { id: "call_1".to_string(), name: name.to_string(), arguments }
    }

    #[tokio::test]
    async fn test_engine_simple_final_answer() {
        let provider = Arc::new(ScriptedProvider::new(vec![Ok(OrchestrationResult::new(
            "Final article".to_string(),
            vec![],
            FinishReason::Stop,
        ))]));

        let engine = LinearEngine::with_defaults(provider, vec![]);
        let mut context = GenerationContext::new(ModelParameters::default());

        let result = engine.execute("write", &mut context).await.unwrap();
        assert_eq!(result.response, "Final article");
        assert_eq!(result.finish_reason, FinishReason::Stop);
    }

    #[tokio::test]
    async fn test_engine_executes_tools_then_finishes() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(OrchestrationResult::new(
                String::new(),
                vec![call("outline_generator", json!({"topic": "Remote Work"}))],
                FinishReason::Stop,
            )),
            Ok(OrchestrationResult::new("Final article".to_string(), vec![], FinishReason::Stop)),
        ]));

        let engine = LinearEngine::with_defaults(provider, vec![outline_tool()]);
        let mut context = GenerationContext::new(ModelParameters::default());

        let result = engine.execute("write", &mut context).await.unwrap();
        assert_eq!(result.response, "Final article");

        // The tool result was fed back into the conversation.
        assert!(context
            .conversation_history
            .iter()
            .any(|m| m.role == "tool" && m.content.contains("outline for Remote Work")));
    }

    #[tokio::test]
    async fn test_engine_recovers_from_one_malformed_step() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Err("unexpected end of JSON".to_string()),
            Ok(OrchestrationResult::new(
                String::new(),
                vec![call("outline_generator", json!({"topic": "Remote Work"}))],
                FinishReason::Stop,
            )),
            Ok(OrchestrationResult::new("Final article".to_string(), vec![], FinishReason::Stop)),
        ]));

        let engine = LinearEngine::with_defaults(provider, vec![outline_tool()]);
        let mut context = GenerationContext::new(ModelParameters::default());

        let result = engine.execute("write", &mut context).await.unwrap();
        assert_eq!(result.response, "Final article");
        assert_eq!(result.finish_reason, FinishReason::Stop);

        // The malformed step left a feedback message behind.
        assert!(context
            .conversation_history
            .iter()
            .any(|m| m.content.contains("malformed")));
    }

    #[tokio::test]
    async fn test_engine_invalid_arguments_fail_only_that_call() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            // Missing the required 'topic' key
            Ok(OrchestrationResult::new(
                String::new(),
                vec![call("outline_generator", json!({"subject": "Remote Work"}))],
                FinishReason::Stop,
            )),
            // Corrected call
            Ok(OrchestrationResult::new(
                String::new(),
                vec![call("outline_generator", json!({"topic": "Remote Work"}))],
                FinishReason::Stop,
            )),
            Ok(OrchestrationResult::new("Final article".to_string(), vec![], FinishReason::Stop)),
        ]));

        let engine = LinearEngine::with_defaults(provider, vec![outline_tool()]);
        let mut context = GenerationContext::new(ModelParameters::default());

        let result = engine.execute("write", &mut context).await.unwrap();
        assert_eq!(result.response, "Final article");

        let failed = context
            .conversation_history
            .iter()
            .filter(|m| m.content.contains("failed"))
            .count();
        assert_eq!(failed, 1);
    }

    #[tokio::test]
    async fn test_engine_unknown_tool_fails_softly() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(OrchestrationResult::new(
                String::new(),
                vec![call("nonexistent_tool", json!({}))],
                FinishReason::Stop,
            )),
            Ok(OrchestrationResult::new("Final article".to_string(), vec![], FinishReason::Stop)),
        ]));

        let engine = LinearEngine::with_defaults(provider, vec![outline_tool()]);
        let mut context = GenerationContext::new(ModelParameters::default());

        let result = engine.execute("write", &mut context).await.unwrap();
        assert_eq!(result.response, "Final article");
        assert!(context
            .conversation_history
            .iter()
            .any(|m| m.content.contains("not found")));
    }

    #[tokio::test]
    async fn test_engine_iteration_budget() {
        // Provider that always requests a tool call
        let steps = (0..10)
            .map(|_| {
                Ok(OrchestrationResult::new(
                    String::new(),
                    vec![call("outline_generator", json!({"topic": "loop"}))],
                    FinishReason::Stop,
                ))
            })
            .collect();
        let provider = Arc::new(ScriptedProvider::new(steps));

        let engine = LinearEngine::new(
            provider,
            vec![outline_tool()],
            EngineConfig { max_iterations: 3, timeout_seconds: 300 },
        );
        let mut context = GenerationContext::new(ModelParameters::default());

        let result = engine.execute("write", &mut context).await.unwrap();
        assert_eq!(result.finish_reason, FinishReason::MaxIterations);
    }
}
