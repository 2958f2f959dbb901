//! Model abstraction layer for Quill.
//!
//! This module defines the core traits and types for interacting with
//! language-model backends. Everything in the content-generation pipeline
//! talks to a model through the [`Model`] trait, never a concrete client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Represents an error that can occur when interacting with a language model.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelError {
    /// An error occurred during the API request (e.g., network issues, invalid request).
    #[error("Request Error: {0}")]
    RequestError(String),

    /// The model returned an error (e.g., invalid input, content policy).
    #[error("Model Response Error: {0}")]
    ModelResponseError(String),

    /// An error occurred during serialization or deserialization.
    #[error("Serialization Error: {0}")]
    SerializationError(String),

    /// The model provider or model id is not supported.
    #[error("Unsupported Model Provider: {0}")]
    UnsupportedModelProvider(String),

    /// A required credential or configuration value is missing.
    ///
    /// Surfaced before any generation request runs; never recoverable
    /// mid-run.
    #[error("Configuration Error: {0}")]
    Configuration(String),

    /// Provider quota exceeded or rate limit hit (hard stop error).
    #[error("Provider '{provider}' quota exceeded{}", message.as_ref().map(|m| format!(": {}", m)).unwrap_or_default())]
    QuotaExceeded {
        /// The provider name (e.g., "openai").
        provider: String,
        /// Optional error message from the provider.
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// Other unexpected errors.
    #[error("Other Model Error: {0}")]
    Other(String),
}

/// Represents a message in a conversation with a chat model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message sender (e.g., "user", "assistant", "system").
    pub role: String,
    /// The content of the message.
    pub content: String,
}

impl ChatMessage {
    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: "assistant".to_string(), content: content.into() }
    }

    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }
}

/// Parameters for controlling the model's generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelParameters {
    /// What sampling temperature to use. Generation runs clamp this to
    /// [0.0, 1.0] before a request is sent.
    pub temperature: Option<f32>,

    /// Nucleus sampling: the model considers the tokens with `top_p`
    /// probability mass.
    pub top_p: Option<f32>,

    /// The maximum number of tokens to generate in the completion.
    pub max_tokens: Option<u32>,

    /// Up to 4 sequences where the API will stop generating further tokens.
    pub stop_sequences: Option<Vec<String>>,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            temperature: Some(0.8),
            top_p: Some(1.0),
            max_tokens: None,
            stop_sequences: None,
        }
    }
}

impl ModelParameters {
    /// Creates parameters with the given temperature, clamped to [0.0, 1.0].
    #[must_use]
    pub fn with_temperature(temperature: f32) -> Self {
        Self { temperature: Some(temperature.clamp(0.0, 1.0)), ..Default::default() }
    }
}

/// The response from a text generation or chat completion model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelResponse {
    /// The generated content.
    pub content: String,

    /// Optional: The ID of the model used to generate the response.
    pub model_id: Option<String>,

    /// Optional: Usage statistics for the request.
    pub usage: Option<ModelUsage>,
}

/// Usage statistics for a model request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelUsage {
    /// Number of tokens in the prompt.
    pub prompt_tokens: u32,

    /// Number of tokens in the completion.
    pub completion_tokens: u32,

    /// Total number of tokens used.
    pub total_tokens: u32,
}

/// A trait for interacting with different language models.
///
/// All models must be `Send + Sync` to allow concurrent use across threads.
#[async_trait]
pub trait Model: Send + Sync {
    /// Generates a text completion based on the given prompt.
    ///
    /// # Arguments
    /// * `prompt` - The input prompt for text generation
    /// * `parameters` - Optional parameters to control generation
    ///
    /// # Errors
    /// Returns a `ModelError` if generation fails.
    async fn generate_text(
        &self,
        prompt: &str,
        parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError>;

    /// Generates a chat completion based on the given conversation history.
    ///
    /// # Arguments
    /// * `messages` - The conversation history as a slice of chat messages
    /// * `parameters` - Optional parameters to control generation
    ///
    /// # Errors
    /// Returns a `ModelError` if generation fails.
    async fn generate_chat_completion(
        &self,
        messages: &[ChatMessage],
        parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError>;

    /// Returns the ID of the model.
    fn model_id(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parameters() {
        let params = ModelParameters::default();
        assert_eq!(params.temperature, Some(0.8));
        assert_eq!(params.top_p, Some(1.0));
        assert!(params.max_tokens.is_none());
        assert!(params.stop_sequences.is_none());
    }

    #[test]
    fn test_with_temperature_clamps() {
        let params = ModelParameters::with_temperature(1.7);
        assert_eq!(params.temperature, Some(1.0));

        let params = ModelParameters::with_temperature(-0.3);
        assert_eq!(params.temperature, Some(0.0));

        let params = ModelParameters::with_temperature(0.4);
        assert_eq!(params.temperature, Some(0.4));
    }

    #[test]
    fn test_chat_message_constructors() {
        assert_eq!(ChatMessage::user("hi").role, "user");
        assert_eq!(ChatMessage::assistant("hi").role, "assistant");
        assert_eq!(ChatMessage::system("hi").role, "system");
    }

    #[test]
    fn test_configuration_error_display() {
        let err = ModelError::Configuration("OPENAI_API_KEY not set".to_string());
        assert_eq!(err.to_string(), "Configuration Error: OPENAI_API_KEY not set");
    }

    #[test]
    fn test_quota_error_display() {
        let err = ModelError::QuotaExceeded {
            provider: "openai".to_string(),
            message: Some("insufficient_quota".to_string()),
        };
        assert!(err.to_string().contains("openai"));
        assert!(err.to_string().contains("insufficient_quota"));

        let err = ModelError::QuotaExceeded { provider: "openai".to_string(), message: None };
        assert_eq!(err.to_string(), "Provider 'openai' quota exceeded");
    }
}
