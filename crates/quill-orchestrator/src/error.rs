// Error types for content generation

use quill_abstraction::ModelError;
use thiserror::Error;

/// Result type for generation operations
pub type Result<T> = std::result::Result<T, GenerationError>;

/// Generation errors
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Missing credential or unsupported model selection.
    /// Surfaced before any model call runs.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Request parameters rejected at construction
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Model error (transport, provider response, quota)
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Invalid tool arguments
    #[error("Invalid tool arguments for '{tool}': {reason}")]
    InvalidToolArguments {
        /// Tool name
        tool: String,
        /// Reason why arguments are invalid
        reason: String,
    },

    /// The reasoning step produced tool-call output that could not be parsed.
    /// Recovered locally inside the linear loop.
    #[error("Malformed tool call: {0}")]
    MalformedToolCall(String),

    /// A crew task failed; the whole run aborts with no partial output
    #[error("Task '{task}' failed: {reason}")]
    TaskFailed {
        /// Task name
        task: String,
        /// Failure reason
        reason: String,
    },

    /// The linear loop exhausted its step budget without a final answer
    #[error("Iteration budget ({0}) exhausted before a final answer")]
    IterationBudget(usize),

    /// Prompt template error
    #[error("Template error: {0}")]
    Template(String),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other error
    #[error("Generation error: {0}")]
    Other(String),
}
