//! Prompt templates for the generation stages.
//!
//! Implements string templates with `{{key}}` placeholder replacement. The
//! three stage templates are fixed; callers bind their fields through a
//! [`PromptContext`].

use std::collections::HashMap;

use crate::error::{GenerationError, Result};

/// Template for the outline stage.
pub const OUTLINE_TEMPLATE: &str = "Create a detailed outline for a blog post about '{{topic}}' \
     for audience '{{audience}}'. Include:\n\
     - Main sections\n\
     - Sub-sections\n\
     - Key points\n\
     - Suggested call-to-action";

/// Template for the draft stage.
pub const DRAFT_TEMPLATE: &str = "Write a comprehensive blog post about {{topic}} for \
     {{audience}} ({{tone}} tone, {{word_count}} words). Keywords: {{keywords}}";

/// Template for the SEO pass.
pub const SEO_TEMPLATE: &str =
    "Improve SEO for this content using keywords {{keywords}}:\n\n{{text}}";

/// Prompt template context for variable replacement.
///
/// Stores key-value pairs that will be used to replace placeholders in templates.
#[derive(Debug, Clone, Default)]
pub struct PromptContext {
    values: HashMap<String, String>,
}

impl PromptContext {
    /// Create a new empty context.
    pub fn new() -> Self {
        Self { values: HashMap::new() }
    }

    /// Set a context value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Get a context value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Check if context contains a key.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

/// Prompt template with `{{key}}` placeholders.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// Template content.
    content: String,
}

impl PromptTemplate {
    /// Create a template from a string.
    pub fn from_string(content: impl Into<String>) -> Self {
        Self { content: content.into() }
    }

    /// Get the template content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Render the template with the given context.
    ///
    /// Replaces all placeholders in the format `{{KEY}}` with values from
    /// the context; missing keys are replaced with the empty string.
    pub fn render(&self, context: &PromptContext) -> String {
        self.render_internal(context, false).unwrap_or_else(|_| self.content.clone())
    }

    /// Render the template, erroring on any missing placeholder.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Template` if a placeholder has no value in
    /// the context.
    pub fn render_strict(&self, context: &PromptContext) -> Result<String> {
        self.render_internal(context, true)
    }

    fn render_internal(&self, context: &PromptContext, strict: bool) -> Result<String> {
        let mut result = self.content.clone();

        for placeholder in Self::find_placeholders(&result) {
            let replacement = match context.get(&placeholder) {
                Some(value) => value.to_string(),
                None if strict => {
                    return Err(GenerationError::Template(format!(
                        "missing placeholder value: {placeholder}"
                    )));
                }
                None => String::new(),
            };

            let pattern = format!("{{{{{}}}}}", placeholder);
            result = result.replace(&pattern, &replacement);
        }

        Ok(result)
    }

    /// Find all placeholders in the template.
    fn find_placeholders(content: &str) -> Vec<String> {
        let mut placeholders = Vec::new();
        let mut chars = content.chars().peekable();

        while let Some(c) = chars.next() {
            #[allow(clippy::collapsible_if)]
            if c == '{' {
                if chars.peek() == Some(&'{') {
                    chars.next(); // consume second {

                    // Read until we find }}
                    let mut placeholder = String::new();
                    let mut found_end = false;

                    #[allow(clippy::collapsible_if)]
                    while let Some(c) = chars.next() {
                        if c == '}' {
                            if chars.peek() == Some(&'}') {
                                chars.next(); // consume second }
                                found_end = true;
                                break;
                            }
                        }
                        placeholder.push(c);
                    }

                    if found_end && !placeholder.is_empty() {
                        let placeholder = placeholder.trim().to_string();
                        if !placeholders.contains(&placeholder) {
                            placeholders.push(placeholder);
                        }
                    }
                }
            }
        }

        placeholders
    }

    /// List all placeholders in the template.
    pub fn list_placeholders(&self) -> Vec<String> {
        Self::find_placeholders(&self.content)
    }
}
