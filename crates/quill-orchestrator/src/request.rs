//! Generation request and strategy selection types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{GenerationError, Result};

/// Minimum accepted article length in words.
pub const MIN_WORD_COUNT: u32 = 300;

/// Maximum accepted article length in words.
pub const MAX_WORD_COUNT: u32 = 5000;

/// A single blog-post generation request.
///
/// Immutable once constructed; fully supplied by the caller before any
/// stage runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Blog topic.
    pub topic: String,
    /// Target audience.
    pub audience: String,
    /// Desired tone (e.g., "professional", "insightful yet accessible").
    pub tone: String,
    /// Target article length in words, within [300, 5000].
    pub word_count: u32,
    /// Comma-separated keywords to include.
    pub keywords: String,
}

impl GenerationRequest {
    /// Creates a validated request.
    ///
    /// # Errors
    /// Returns `GenerationError::InvalidRequest` if the topic is empty or
    /// the word count is outside [300, 5000].
    pub fn new(
        topic: impl Into<String>,
        audience: impl Into<String>,
        tone: impl Into<String>,
        word_count: u32,
        keywords: impl Into<String>,
    ) -> Result<Self> {
        let topic = topic.into();
        if topic.trim().is_empty() {
            return Err(GenerationError::InvalidRequest("topic must not be empty".to_string()));
        }
        if !(MIN_WORD_COUNT..=MAX_WORD_COUNT).contains(&word_count) {
            return Err(GenerationError::InvalidRequest(format!(
                "word_count {word_count} outside [{MIN_WORD_COUNT}, {MAX_WORD_COUNT}]"
            )));
        }

        Ok(Self {
            topic,
            audience: audience.into(),
            tone: tone.into(),
            word_count,
            keywords: keywords.into(),
        })
    }
}

/// Orchestration strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    /// Single autonomous tool-calling loop over the stage capabilities.
    Linear,
    /// Fixed role-agent pipeline with explicit task dependencies.
    Crew,
}

impl FromStr for Strategy {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "crew" => Ok(Self::Crew),
            other => Err(GenerationError::InvalidRequest(format!(
                "unknown strategy: {other} (expected 'linear' or 'crew')"
            ))),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Crew => write!(f, "crew"),
        }
    }
}
