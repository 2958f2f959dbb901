//! Model factory for creating model instances from configuration.
//!
//! A [`ModelConfig`] carries everything one generation run needs to build
//! its model: provider, model id, temperature, and the API key. The key is
//! always an explicit value supplied by the caller; the factory never
//! consults the environment, so a missing credential fails here, before any
//! generation request can run.

use crate::{MockModel, OpenAIModel};
use quill_abstraction::{Model, ModelError, ModelParameters};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, error};

/// Model provider enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelType {
    /// Mock model for testing and offline runs.
    Mock,
    /// OpenAI model.
    OpenAI,
}

impl FromStr for ModelType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "openai" => Ok(Self::OpenAI),
            _ => Err(()),
        }
    }
}

impl ModelType {
    /// Infers the provider from a model identifier.
    ///
    /// Supported identifiers: "gpt-4" and "gpt-3.5-turbo" (OpenAI), "mock".
    ///
    /// # Errors
    /// Returns a `ModelError` for identifiers outside the supported set.
    pub fn from_model_id(model_id: &str) -> Result<Self, ModelError> {
        match model_id {
            "gpt-4" | "gpt-3.5-turbo" => Ok(Self::OpenAI),
            "mock" => Ok(Self::Mock),
            other => Err(ModelError::UnsupportedModelProvider(format!(
                "Unsupported model id: {other}. Supported: gpt-4, gpt-3.5-turbo, mock"
            ))),
        }
    }
}

/// Model configuration for one generation run.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// The provider to create a model for.
    pub model_type: ModelType,
    /// The model ID (e.g., "gpt-4").
    pub model_id: String,
    /// Sampling temperature, clamped to [0.0, 1.0] when applied.
    pub temperature: f32,
    /// API key. Required for OpenAI, ignored for Mock.
    pub api_key: Option<String>,
    /// Optional base URL override (OpenAI-compatible endpoints, tests).
    pub base_url: Option<String>,
}

impl ModelConfig {
    /// Creates a new `ModelConfig` from a supported model identifier.
    ///
    /// # Errors
    /// Returns a `ModelError` if the identifier is not supported.
    pub fn for_model_id(model_id: &str, temperature: f32) -> Result<Self, ModelError> {
        let model_type = ModelType::from_model_id(model_id)?;
        Ok(Self {
            model_type,
            model_id: model_id.to_string(),
            temperature,
            api_key: None,
            base_url: None,
        })
    }

    /// Sets the API key for this configuration.
    #[must_use]
    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// Sets a base URL override for this configuration.
    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Generation parameters derived from this configuration.
    #[must_use]
    pub fn parameters(&self) -> ModelParameters {
        ModelParameters::with_temperature(self.temperature)
    }
}

/// Factory for creating model instances.
pub struct ModelFactory;

impl ModelFactory {
    /// Creates a model instance from the given configuration.
    ///
    /// # Errors
    /// Returns `ModelError::Configuration` when a provider that requires a
    /// credential is selected without one.
    pub fn create(config: &ModelConfig) -> Result<Arc<dyn Model + Send + Sync>, ModelError> {
        debug!(
            model_type = ?config.model_type,
            model_id = %config.model_id,
            "Creating model instance"
        );

        match config.model_type {
            ModelType::Mock => {
                let model = MockModel::new(config.model_id.clone());
                Ok(Arc::new(model))
            }
            ModelType::OpenAI => {
                let api_key = config.api_key.clone().ok_or_else(|| {
                    error!(model_id = %config.model_id, "No API key configured for OpenAI model");
                    ModelError::Configuration(
                        "OPENAI_API_KEY is required for OpenAI models".to_string(),
                    )
                })?;

                let mut model = OpenAIModel::with_api_key(config.model_id.clone(), api_key);
                if let Some(ref base_url) = config.base_url {
                    model = model.with_base_url(base_url.clone());
                }
                Ok(Arc::new(model))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_type_from_str() {
        assert_eq!(ModelType::from_str("mock"), Ok(ModelType::Mock));
        assert_eq!(ModelType::from_str("Mock"), Ok(ModelType::Mock));
        assert_eq!(ModelType::from_str("openai"), Ok(ModelType::OpenAI));
        assert_eq!(ModelType::from_str("OPENAI"), Ok(ModelType::OpenAI));
        assert_eq!(ModelType::from_str("unknown"), Err(()));
    }

    #[test]
    fn test_model_type_from_model_id() {
        assert_eq!(ModelType::from_model_id("gpt-4").unwrap(), ModelType::OpenAI);
        assert_eq!(ModelType::from_model_id("gpt-3.5-turbo").unwrap(), ModelType::OpenAI);
        assert_eq!(ModelType::from_model_id("mock").unwrap(), ModelType::Mock);
        assert!(ModelType::from_model_id("gpt-7").is_err());
    }

    #[test]
    fn test_model_config_builder() {
        let config = ModelConfig::for_model_id("gpt-4", 0.8).unwrap();
        assert_eq!(config.model_type, ModelType::OpenAI);
        assert_eq!(config.model_id, "gpt-4");
        assert_eq!(config.api_key, None);

        let config = config.with_api_key("test-key".to_string());
        assert_eq!(config.api_key, Some("test-key".to_string()));
    }

    #[test]
    fn test_config_parameters_clamp_temperature() {
        let config = ModelConfig::for_model_id("mock", 1.6).unwrap();
        assert_eq!(config.parameters().temperature, Some(1.0));
    }

    #[test]
    fn test_factory_create_mock() {
        let config = ModelConfig::for_model_id("mock", 0.8).unwrap();
        let model = ModelFactory::create(&config).unwrap();
        assert_eq!(model.model_id(), "mock");
    }

    #[test]
    fn test_factory_create_openai_with_api_key() {
        let config =
            ModelConfig::for_model_id("gpt-4", 0.8).unwrap().with_api_key("test-key".to_string());
        let model = ModelFactory::create(&config).unwrap();
        assert_eq!(model.model_id(), "gpt-4");
    }

    #[test]
    fn test_factory_missing_api_key_is_configuration_error() {
        let config = ModelConfig::for_model_id("gpt-4", 0.8).unwrap();
        let err = ModelFactory::create(&config).err().unwrap();
        assert!(matches!(err, ModelError::Configuration(_)));
    }
}
