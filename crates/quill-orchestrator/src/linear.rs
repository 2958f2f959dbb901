//! Linear strategy: a single autonomous tool-calling loop.
//!
//! The orchestrator exposes the three stage functions as capabilities,
//! hands the reasoning provider an instruction describing the desired
//! three-step process, and lets the loop decide which capability to invoke
//! each turn until it declares the task finished.

use quill_abstraction::{Model, ModelParameters};
use std::sync::Arc;
use tracing::debug;

use crate::error::{GenerationError, Result};
use crate::orchestration::{
    FinishReason, OrchestrationProvider,
    context::GenerationContext,
    engine::{EngineConfig, LinearEngine},
    stage_tools::{OUTLINE_TOOL, SEO_TOOL, WRITER_TOOL, stage_tools},
};
use crate::output::GenerationOutput;
use crate::request::GenerationRequest;

/// Orchestrator driving the reasoning loop over the stage capabilities.
pub struct LinearOrchestrator {
    engine: LinearEngine,
    parameters: ModelParameters,
    max_iterations: usize,
}

impl LinearOrchestrator {
    /// Creates an orchestrator with the default engine configuration.
    pub fn new(
        provider: Arc<dyn OrchestrationProvider>,
        model: Arc<dyn Model + Send + Sync>,
        parameters: ModelParameters,
    ) -> Self {
        Self::with_config(provider, model, parameters, EngineConfig::default())
    }

    /// Creates an orchestrator with a custom engine configuration.
    pub fn with_config(
        provider: Arc<dyn OrchestrationProvider>,
        model: Arc<dyn Model + Send + Sync>,
        parameters: ModelParameters,
        config: EngineConfig,
    ) -> Self {
        let tools = stage_tools(model, parameters.clone());
        let max_iterations = config.max_iterations;
        Self { engine: LinearEngine::new(provider, tools, config), parameters, max_iterations }
    }

    /// Produces a finished article for the request.
    ///
    /// # Errors
    /// Model/transport errors propagate unmodified; exhausting the
    /// iteration budget surfaces as `GenerationError::IterationBudget`.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutput> {
        let instruction = Self::build_instruction(request);
        let mut context = GenerationContext::new(self.parameters.clone());

        debug!(
            run_id = %context.run_id,
            provider = self.engine.provider_name(),
            tool_count = self.engine.tool_count(),
            "starting linear generation run"
        );

        let result = self.engine.execute(&instruction, &mut context).await?;

        match result.finish_reason {
            FinishReason::Stop => Ok(GenerationOutput::PlainText(result.response)),
            FinishReason::MaxIterations => {
                Err(GenerationError::IterationBudget(self.max_iterations))
            }
            FinishReason::Error => Err(GenerationError::Other(result.response)),
        }
    }

    /// Builds the run instruction describing the three-step process.
    fn build_instruction(request: &GenerationRequest) -> String {
        format!(
            "Write a blog post about {topic} for {audience} with a {tone} tone, \
             {word_count} words, using keywords: {keywords}. Follow this process:\n\
             1. First create an outline using {outline}\n\
             2. Then write the full post using {writer}\n\
             3. Finally optimize for SEO using {seo}\n\
             When the optimized post is ready, return it as your final answer.",
            topic = request.topic,
            audience = request.audience,
            tone = request.tone,
            word_count = request.word_count,
            keywords = request.keywords,
            outline = OUTLINE_TOOL,
            writer = WRITER_TOOL,
            seo = SEO_TOOL,
        )
    }
}
