// Conversation context for one linear generation run
//
// Tracks the message history the reasoning provider sees, plus the
// generation parameters shared by every turn. Constructed fresh per run;
// nothing persists across invocations.

use chrono::{DateTime, Utc};
use quill_abstraction::ModelParameters;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Message in conversation history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message role (user, assistant, system, tool)
    pub role: String,
    /// Message content
    pub content: String,
    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into(), timestamp: Utc::now() }
    }

    /// Create a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: "assistant".to_string(), content: content.into(), timestamp: Utc::now() }
    }

    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into(), timestamp: Utc::now() }
    }

    /// Create a new tool-result message
    pub fn tool(content: impl Into<String>) -> Self {
        Self { role: "tool".to_string(), content: content.into(), timestamp: Utc::now() }
    }
}

/// Context for one generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationContext {
    /// Run identifier
    pub run_id: String,
    /// Conversation history
    pub conversation_history: Vec<Message>,
    /// Generation parameters shared by every turn of this run
    pub parameters: ModelParameters,
    /// When the run was created
    pub created_at: DateTime<Utc>,
}

impl GenerationContext {
    /// Create a new generation context with a fresh run id
    pub fn new(parameters: ModelParameters) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            conversation_history: Vec::new(),
            parameters,
            created_at: Utc::now(),
        }
    }

    /// Add a message to conversation history
    pub fn add_message(&mut self, message: Message) {
        self.conversation_history.push(message);
    }

    /// Add an assistant message
    pub fn add_assistant_message(&mut self, content: impl Into<String>) {
        self.add_message(Message::assistant(content));
    }

    /// Add a tool-result message
    pub fn add_tool_message(&mut self, content: impl Into<String>) {
        self.add_message(Message::tool(content));
    }

    /// Get number of messages in history
    pub fn history_length(&self) -> usize {
        self.conversation_history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        assert_eq!(Message::user("Hello").role, "user");
        assert_eq!(Message::assistant("Hi").role, "assistant");
        assert_eq!(Message::system("sys").role, "system");
        assert_eq!(Message::tool("out").role, "tool");
    }

    #[test]
    fn test_generation_context() {
        let mut ctx = GenerationContext::new(ModelParameters::with_temperature(0.5));
        assert_eq!(ctx.history_length(), 0);
        assert!(!ctx.run_id.is_empty());
        assert_eq!(ctx.parameters.temperature, Some(0.5));

        ctx.add_assistant_message("working on it");
        ctx.add_tool_message("tool output");
        assert_eq!(ctx.history_length(), 2);
        assert_eq!(ctx.conversation_history[1].role, "tool");
    }

    #[test]
    fn test_fresh_run_ids() {
        let a = GenerationContext::new(ModelParameters::default());
        let b = GenerationContext::new(ModelParameters::default());
        assert_ne!(a.run_id, b.run_id);
    }
}
