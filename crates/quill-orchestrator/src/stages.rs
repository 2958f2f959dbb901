//! Stage functions: the three atomic generation steps.
//!
//! Each function binds a template with caller-supplied fields, sends one
//! generation request to the model, and returns the raw text response.
//! No retries, no validation of model output content; any error from the
//! model propagates unmodified to the caller.

use quill_abstraction::{Model, ModelParameters};
use tracing::debug;

use crate::error::Result;
use crate::prompts::{DRAFT_TEMPLATE, OUTLINE_TEMPLATE, PromptContext, PromptTemplate, SEO_TEMPLATE};

/// Generates a content outline for the given topic and audience.
///
/// # Errors
/// Propagates any model error unmodified.
pub async fn generate_outline(
    topic: &str,
    audience: &str,
    model: &dyn Model,
    parameters: &ModelParameters,
) -> Result<String> {
    let mut context = PromptContext::new();
    context.set("topic", topic);
    context.set("audience", audience);

    let prompt = PromptTemplate::from_string(OUTLINE_TEMPLATE).render_strict(&context)?;
    debug!(topic, audience, "generating outline");

    let response = model.generate_text(&prompt, Some(parameters.clone())).await?;
    Ok(response.content)
}

/// Generates a complete blog post draft.
///
/// # Errors
/// Propagates any model error unmodified.
pub async fn generate_blog_post(
    topic: &str,
    audience: &str,
    tone: &str,
    word_count: u32,
    keywords: &str,
    model: &dyn Model,
    parameters: &ModelParameters,
) -> Result<String> {
    let mut context = PromptContext::new();
    context.set("topic", topic);
    context.set("audience", audience);
    context.set("tone", tone);
    context.set("word_count", word_count.to_string());
    context.set("keywords", keywords);

    let prompt = PromptTemplate::from_string(DRAFT_TEMPLATE).render_strict(&context)?;
    debug!(topic, word_count, "generating blog post draft");

    let response = model.generate_text(&prompt, Some(parameters.clone())).await?;
    Ok(response.content)
}

/// Rewrites content for search-engine optimization around the keywords.
///
/// # Errors
/// Propagates any model error unmodified.
pub async fn seo_optimize(
    text: &str,
    keywords: &str,
    model: &dyn Model,
    parameters: &ModelParameters,
) -> Result<String> {
    let mut context = PromptContext::new();
    context.set("text", text);
    context.set("keywords", keywords);

    let prompt = PromptTemplate::from_string(SEO_TEMPLATE).render_strict(&context)?;
    debug!(keywords, text_len = text.len(), "optimizing content for SEO");

    let response = model.generate_text(&prompt, Some(parameters.clone())).await?;
    Ok(response.content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_models::MockModel;

    #[tokio::test]
    async fn test_generate_outline_binds_fields() {
        let model = MockModel::new("mock".to_string());
        let params = ModelParameters::default();

        let outline =
            generate_outline("Remote Work", "HR managers", &model, &params).await.unwrap();

        // MockModel echoes the prompt, so the rendered template is visible.
        assert!(outline.contains("'Remote Work'"));
        assert!(outline.contains("'HR managers'"));
    }

    #[tokio::test]
    async fn test_generate_blog_post_binds_all_fields() {
        let model = MockModel::new("mock".to_string());
        let params = ModelParameters::default();

        let draft = generate_blog_post(
            "Remote Work",
            "HR managers",
            "professional",
            500,
            "remote work, productivity",
            &model,
            &params,
        )
        .await
        .unwrap();

        assert!(draft.contains("Remote Work"));
        assert!(draft.contains("professional"));
        assert!(draft.contains("500 words"));
        assert!(draft.contains("remote work, productivity"));
    }

    #[tokio::test]
    async fn test_seo_optimize_embeds_text() {
        let model = MockModel::new("mock".to_string());
        let params = ModelParameters::default();

        let optimized =
            seo_optimize("Draft body", "remote work", &model, &params).await.unwrap();

        assert!(optimized.contains("Draft body"));
        assert!(optimized.contains("remote work"));
    }
}
