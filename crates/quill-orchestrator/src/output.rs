//! Orchestrator output shapes and the result normalizer.
//!
//! The two strategies return differently shaped results: the linear loop
//! yields plain text, the crew coordinator yields a structured record with
//! a primary `raw` field plus auxiliary metadata. The tagged union below
//! makes the normalizer a total, exhaustive match.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Result produced by an orchestration strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GenerationOutput {
    /// A plain text article (linear strategy).
    PlainText(String),
    /// A structured result carrying the article plus run metadata
    /// (crew strategy).
    Structured {
        /// Primary text field: the finished article.
        raw: String,
        /// Auxiliary metadata (task ordering, roles, model id).
        metadata: HashMap<String, Value>,
    },
}

impl GenerationOutput {
    /// Collapses this output into a single string.
    ///
    /// Plain text is returned unchanged. A structured result yields its
    /// `raw` field; if that field is empty, the whole record is rendered
    /// to JSON instead.
    #[must_use]
    pub fn normalize(self) -> String {
        match self {
            Self::PlainText(text) => text,
            Self::Structured { raw, metadata } => {
                if raw.trim().is_empty() {
                    serde_json::json!({ "raw": raw, "metadata": metadata }).to_string()
                } else {
                    raw
                }
            }
        }
    }
}
