//! Quill CLI - Command-line interface for the Quill blog-post generator
//!
//! This CLI provides a `quill` command for generating finished blog
//! articles through either of the two orchestration strategies (a linear
//! tool-calling loop or a role-agent crew).

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::generate::GenerateOptions;

/// Quill CLI - AI blog post generation
///
/// Quill produces finished blog articles from a topic, audience, tone,
/// word count, and keywords, driving a language-model backend through a
/// three-stage process: outline, draft, SEO pass.
#[derive(Parser, Debug)]
#[command(
    name = "quill",
    author,
    version,
    about = "Quill - AI blog post generator",
    long_about = "Quill generates blog posts with a language-model backend.\nChoose between a linear tool-calling loop and a role-agent crew with the --strategy flag."
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a blog post
    ///
    /// Runs the full outline -> draft -> SEO process with the selected
    /// orchestration strategy and prints the finished article.
    Generate {
        /// Blog topic
        #[arg(long, default_value = "The Future of AI in Content Creation")]
        topic: String,

        /// Target audience
        #[arg(long, default_value = "marketing professionals")]
        audience: String,

        /// Desired tone
        #[arg(long, default_value = "insightful yet accessible")]
        tone: String,

        /// Target length in words (300-5000)
        #[arg(long, default_value_t = 1200)]
        word_count: u32,

        /// Comma-separated keywords to include
        #[arg(
            long,
            default_value = "AI content creation, future of marketing, automated content"
        )]
        keywords: String,

        /// Orchestration strategy (linear or crew)
        #[arg(long, default_value = "linear")]
        strategy: String,

        /// Model to use (gpt-4, gpt-3.5-turbo, mock)
        #[arg(long, default_value = "gpt-4")]
        model: String,

        /// Creativity (temperature), between 0.0 and 1.0
        #[arg(long, default_value_t = 0.8)]
        temperature: f32,

        /// Write the article to this file
        #[arg(long)]
        output: Option<std::path::PathBuf>,

        /// Write the article to blog_post_<topic>.txt in the current directory
        #[arg(long)]
        save: bool,
    },

    /// List supported models
    Models,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber =
        FmtSubscriber::builder().with_max_level(level).without_time().with_target(false).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::Generate {
            topic,
            audience,
            tone,
            word_count,
            keywords,
            strategy,
            model,
            temperature,
            output,
            save,
        } => {
            commands::generate::execute(GenerateOptions {
                topic,
                audience,
                tone,
                word_count,
                keywords,
                strategy,
                model,
                temperature,
                output,
                save,
            })
            .await
        }
        Command::Models => commands::models::execute(),
    }
}
