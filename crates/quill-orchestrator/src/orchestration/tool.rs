// Capability abstractions for the linear strategy
//
// A Tool is a stage function exposed to the reasoning loop as an invocable,
// named action with a declared argument schema. Argument payloads are
// validated against the schema before a handler runs; a mismatch fails
// that single invocation, never the whole run.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;

/// Tool call requested by a reasoning step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique ID for this tool call
    pub id: String,
    /// Name of the tool to invoke
    pub name: String,
    /// Arguments for the tool
    pub arguments: Value,
}

/// Tool parameters schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameters {
    /// Type (always "object" for function parameters)
    #[serde(rename = "type")]
    pub param_type: String,
    /// Property definitions
    pub properties: HashMap<String, ToolPropertySchema>,
    /// Required property names
    pub required: Vec<String>,
}

impl ToolParameters {
    /// Create a new tool parameters schema
    pub fn new() -> Self {
        Self { param_type: "object".to_string(), properties: HashMap::new(), required: Vec::new() }
    }

    /// Add a property to the schema
    #[must_use]
    pub fn add_property(
        mut self,
        name: impl Into<String>,
        property_type: impl Into<String>,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        let name = name.into();
        self.properties.insert(
            name.clone(),
            ToolPropertySchema {
                property_type: property_type.into(),
                description: description.into(),
            },
        );
        if required {
            self.required.push(name);
        }
        self
    }

    /// Validate an argument payload against this schema.
    ///
    /// The payload must be a JSON object containing every required key and
    /// no keys outside the declared properties.
    ///
    /// # Errors
    /// Returns a human-readable reason on the first mismatch found.
    pub fn validate(&self, arguments: &Value) -> std::result::Result<(), String> {
        let Some(object) = arguments.as_object() else {
            return Err("arguments must be a JSON object".to_string());
        };

        for required in &self.required {
            if !object.contains_key(required) {
                return Err(format!("missing required key '{required}'"));
            }
        }

        for key in object.keys() {
            if !self.properties.contains_key(key) {
                return Err(format!("undeclared key '{key}'"));
            }
        }

        Ok(())
    }
}

impl Default for ToolParameters {
    fn default() -> Self {
        Self::new()
    }
}

/// Tool property schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolPropertySchema {
    /// Property type
    #[serde(rename = "type")]
    pub property_type: String,
    /// Property description
    pub description: String,
}

/// Arguments passed to tool handler
#[derive(Debug, Clone)]
pub struct ToolArguments {
    /// Parsed arguments as JSON value
    pub args: Value,
}

impl ToolArguments {
    /// Create new tool arguments
    pub fn new(args: Value) -> Self {
        Self { args }
    }

    /// Get argument as string
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.args.get(key)?.as_str().map(str::to_string)
    }

    /// Get argument as i64
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.args.get(key)?.as_i64()
    }
}

/// Result from tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether execution succeeded
    pub success: bool,
    /// Output from the tool, or the failure reason
    pub output: String,
    /// Additional metadata
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(output: impl Into<String>) -> Self {
        Self { success: true, output: output.into(), metadata: HashMap::new() }
    }

    /// Create an error result
    pub fn error(output: impl Into<String>) -> Self {
        Self { success: false, output: output.into(), metadata: HashMap::new() }
    }

    /// Add metadata to the result
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Handler for tool execution
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Execute the tool with given arguments
    ///
    /// # Errors
    /// An `Err` aborts the whole run (e.g. a model/transport failure). A
    /// recoverable problem with the invocation itself must be reported as
    /// `Ok(ToolResult::error(..))` instead.
    async fn execute(&self, args: &ToolArguments) -> Result<ToolResult>;
}

/// Capability definition for the reasoning loop
#[derive(Clone)]
pub struct Tool {
    /// Tool name (used in function calls)
    pub name: String,
    /// Tool description
    pub description: String,
    /// Parameter schema
    pub parameters: ToolParameters,
    /// Handler for executing the tool
    pub handler: Arc<dyn ToolHandler>,
}

impl Tool {
    /// Create a new tool
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: ToolParameters,
        handler: Arc<dyn ToolHandler>,
    ) -> Self {
        Self { name: name.into(), description: description.into(), parameters, handler }
    }

    /// Execute this tool with given arguments.
    ///
    /// Arguments are validated against the schema first; a mismatch yields
    /// `Ok(ToolResult::error(..))` so the caller can feed the failure back
    /// to the reasoning loop.
    pub async fn execute(&self, arguments: &Value) -> Result<ToolResult> {
        if let Err(reason) = self.parameters.validate(arguments) {
            return Ok(ToolResult::error(format!(
                "Invalid arguments for '{}': {reason}",
                self.name
            )));
        }

        let args = ToolArguments::new(arguments.clone());
        self.handler.execute(&args).await
    }
}

// Implement Debug manually since Arc<dyn ToolHandler> doesn't implement Debug
impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .field("handler", &"<handler>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

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
            ToolParameters::new()
                .add_property("topic", "string", "Blog topic", true)
                .add_property("audience", "string", "Target audience", true),
            Arc::new(EchoHandler),
        )
    }

    #[test]
    fn test_tool_parameters_builder() {
        let params = ToolParameters::new()
            .add_property("topic", "string", "The blog topic", true)
            .add_property("tone", "string", "Desired tone", false);

        assert_eq!(params.properties.len(), 2);
        assert_eq!(params.required, vec!["topic"]);
    }

    #[test]
    fn test_validate_accepts_declared_keys() {
        let params = ToolParameters::new()
            .add_property("topic", "string", "The blog topic", true)
            .add_property("tone", "string", "Desired tone", false);

        assert!(params.validate(&json!({"topic": "AI"})).is_ok());
        assert!(params.validate(&json!({"topic": "AI", "tone": "casual"})).is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_required_key() {
        let params = ToolParameters::new().add_property("topic", "string", "The blog topic", true);
        let err = params.validate(&json!({})).unwrap_err();
        assert!(err.contains("topic"));
    }

    #[test]
    fn test_validate_rejects_undeclared_key() {
        let params = ToolParameters::new().add_property("topic", "string", "The blog topic", true);
        let err = params.validate(&json!({"topic": "AI", "extra": 1})).unwrap_err();
        assert!(err.contains("extra"));
    }

    #[test]
    fn test_validate_rejects_non_object() {
        let params = ToolParameters::new();
        assert!(params.validate(&json!("not an object")).is_err());
    }

    #[test]
    fn test_tool_arguments_getters() {
        let args = ToolArguments::new(json!({
            "topic": "Remote Work",
            "word_count": 500
        }));

        assert_eq!(args.get_string("topic"), Some("Remote Work".to_string()));
        assert_eq!(args.get_i64("word_count"), Some(500));
        assert_eq!(args.get_string("missing"), None);
    }

    #[tokio::test]
    async fn test_tool_execute_valid_arguments() {
        let tool = outline_tool();
        let result = tool
            .execute(&json!({"topic": "Remote Work", "audience": "HR managers"}))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.output, "outline for Remote Work");
    }

    #[tokio::test]
    async fn test_tool_execute_invalid_arguments_fails_softly() {
        let tool = outline_tool();

        // Missing required key
        let result = tool.execute(&json!({"topic": "Remote Work"})).await.unwrap();
        assert!(!result.success);
        assert!(result.output.contains("audience"));

        // Extra undeclared key
        let result = tool
            .execute(&json!({"topic": "t", "audience": "a", "style": "x"}))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.output.contains("style"));
    }

    #[test]
    fn test_tool_result_constructors() {
        let result = ToolResult::success("done").with_metadata("stage", "outline");
        assert!(result.success);
        assert_eq!(result.metadata.get("stage"), Some(&"outline".to_string()));

        let result = ToolResult::error("failed");
        assert!(!result.success);
    }
}
