//! Dual-strategy blog-post generation orchestrator for Quill.
//!
//! Given a [`GenerationRequest`], this crate produces a finished article
//! through a sequence of dependent generation stages (outline → draft →
//! SEO pass), using one of two interchangeable strategies:
//!
//! - [`Strategy::Linear`]: a single autonomous tool-calling loop that
//!   decides, turn by turn, which stage capability to invoke.
//! - [`Strategy::Crew`]: three fixed role-agents executing three tasks in
//!   an explicit dependency chain.
//!
//! Both strategies return through one entry point, [`Generator::generate`],
//! which normalizes their differently shaped results into a single string.

pub mod crew;
pub mod error;
pub mod linear;
pub mod orchestration;
pub mod output;
pub mod prompts;
pub mod request;
pub mod stages;

use quill_abstraction::{Model, ModelParameters};
use quill_models::{ModelConfig, ModelFactory, ModelType};
use std::sync::Arc;
use tracing::debug;

pub use crew::{Crew, CrewAgent, CrewTask, TaskState, blog_crew};
pub use error::{GenerationError, Result};
pub use linear::LinearOrchestrator;
pub use orchestration::{
    FinishReason, OrchestrationProvider, OrchestrationResult,
    context::{GenerationContext, Message},
    engine::{EngineConfig, LinearEngine},
    providers::{OpenAIToolProvider, PromptToolProvider},
    stage_tools::stage_tools,
    tool::{Tool, ToolArguments, ToolCall, ToolHandler, ToolParameters, ToolResult},
};
pub use output::GenerationOutput;
pub use request::{GenerationRequest, MAX_WORD_COUNT, MIN_WORD_COUNT, Strategy};

/// Single entry point over both orchestration strategies.
///
/// A generator owns the model and parameters for its runs; orchestrators,
/// agents, and tasks are constructed fresh per run, so concurrent
/// generations share no mutable state.
pub struct Generator {
    model: Arc<dyn Model + Send + Sync>,
    provider: Arc<dyn OrchestrationProvider>,
    parameters: ModelParameters,
    engine_config: EngineConfig,
}

impl Generator {
    /// Creates a generator over an explicit model, reasoning through
    /// prompt-engineered tool calls on that same model.
    pub fn new(model: Arc<dyn Model + Send + Sync>, parameters: ModelParameters) -> Self {
        let provider = Arc::new(PromptToolProvider::new(Arc::clone(&model)));
        Self { model, provider, parameters, engine_config: EngineConfig::default() }
    }

    /// Creates a generator from a model configuration.
    ///
    /// OpenAI models reason through the native function-calling API; other
    /// models fall back to prompt-engineered tool calls.
    ///
    /// # Errors
    /// `GenerationError::Configuration` when the configuration cannot
    /// produce a model (e.g. a missing API key), before any model call.
    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        let model = ModelFactory::create(config).map_err(|e| match e {
            quill_abstraction::ModelError::Configuration(msg)
            | quill_abstraction::ModelError::UnsupportedModelProvider(msg) => {
                GenerationError::Configuration(msg)
            }
            other => GenerationError::Model(other),
        })?;
        let parameters = config.parameters();

        let provider: Arc<dyn OrchestrationProvider> = match config.model_type {
            ModelType::OpenAI => {
                let api_key = config.api_key.clone().ok_or_else(|| {
                    GenerationError::Configuration(
                        "OPENAI_API_KEY is required for OpenAI models".to_string(),
                    )
                })?;
                let mut provider = OpenAIToolProvider::new(config.model_id.clone(), api_key);
                if let Some(ref base_url) = config.base_url {
                    provider = provider.with_base_url(base_url.clone());
                }
                Arc::new(provider)
            }
            ModelType::Mock => Arc::new(PromptToolProvider::new(Arc::clone(&model))),
        };

        Ok(Self { model, provider, parameters, engine_config: EngineConfig::default() })
    }

    /// Overrides the reasoning provider.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn OrchestrationProvider>) -> Self {
        self.provider = provider;
        self
    }

    /// Overrides the linear engine configuration.
    #[must_use]
    pub fn with_engine_config(mut self, config: EngineConfig) -> Self {
        self.engine_config = config;
        self
    }

    /// Produces a finished article for the request using the selected
    /// strategy, normalized to a single string.
    ///
    /// # Errors
    /// Propagates configuration, model, and task failures; the run either
    /// completes with a full article or fails with a single error.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        strategy: Strategy,
    ) -> Result<String> {
        debug!(
            topic = %request.topic,
            %strategy,
            model_id = self.model.model_id(),
            "starting generation run"
        );

        let output = match strategy {
            Strategy::Linear => {
                let orchestrator = LinearOrchestrator::with_config(
                    Arc::clone(&self.provider),
                    Arc::clone(&self.model),
                    self.parameters.clone(),
                    self.engine_config.clone(),
                );
                orchestrator.generate(request).await?
            }
            Strategy::Crew => {
                let crew =
                    blog_crew(request, Arc::clone(&self.model), self.parameters.clone())?;
                crew.kickoff().await?
            }
        };

        Ok(output.normalize())
    }
}
