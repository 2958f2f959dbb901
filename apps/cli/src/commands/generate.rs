//! `quill generate` command - runs one generation end to end.
//!
//! Startup order matters: the API key is read from the environment exactly
//! once, before any generation request runs, so a missing credential fails
//! here and never mid-run. Library crates never touch the environment.

use anyhow::{Context, anyhow};
use colored::Colorize;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

use quill_models::{ModelConfig, ModelType};
use quill_orchestrator::{GenerationRequest, Generator, Strategy};

/// Options collected from the command line for one generation run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub topic: String,
    pub audience: String,
    pub tone: String,
    pub word_count: u32,
    pub keywords: String,
    pub strategy: String,
    pub model: String,
    pub temperature: f32,
    pub output: Option<PathBuf>,
    pub save: bool,
}

/// Runs one generation and prints (and optionally saves) the article.
pub async fn execute(options: GenerateOptions) -> anyhow::Result<()> {
    let strategy = Strategy::from_str(&options.strategy)?;
    let request = GenerationRequest::new(
        options.topic.clone(),
        options.audience.clone(),
        options.tone.clone(),
        options.word_count,
        options.keywords.clone(),
    )?;

    let mut config = ModelConfig::for_model_id(&options.model, options.temperature)?;
    if config.model_type == ModelType::OpenAI {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            anyhow!(
                "OPENAI_API_KEY is not set. Export it before generating, or use --model mock"
            )
        })?;
        config = config.with_api_key(api_key);
    }

    let generator = Generator::from_config(&config)?;

    info!(
        topic = %request.topic,
        %strategy,
        model = %options.model,
        "generating blog post"
    );
    println!("{}", "Generating your blog post...".cyan());

    let article = generator.generate(&request, strategy).await?;

    println!();
    println!("{}", "Generated Blog Post".bold().green());
    println!("{}", "-".repeat(60));
    println!("{article}");

    if let Some(path) = target_path(&options) {
        std::fs::write(&path, &article)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!();
        println!("{} {}", "Saved to".green(), path.display());
    }

    Ok(())
}

/// Resolves where to save the article, if anywhere.
///
/// An explicit `--output` path wins; `--save` falls back to a file named
/// from the truncated topic.
fn target_path(options: &GenerateOptions) -> Option<PathBuf> {
    if let Some(ref path) = options.output {
        return Some(path.clone());
    }
    options.save.then(|| PathBuf::from(download_file_name(&options.topic)))
}

/// File name for a saved article: the topic truncated to 20 characters.
fn download_file_name(topic: &str) -> String {
    let truncated: String = topic.chars().take(20).collect();
    format!("blog_post_{truncated}.txt")
}
