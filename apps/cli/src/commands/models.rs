//! `quill models` command - lists supported models.

use colored::Colorize;

/// Supported model identifiers and what they require.
const MODELS: &[(&str, &str)] = &[
    ("gpt-4", "OpenAI (requires OPENAI_API_KEY)"),
    ("gpt-3.5-turbo", "OpenAI (requires OPENAI_API_KEY)"),
    ("mock", "offline echo model for testing"),
];

/// Prints the supported model identifiers.
pub fn execute() -> anyhow::Result<()> {
    println!("{}", "Supported models".bold());
    for (id, note) in MODELS {
        println!("  {:<16} {}", id.cyan(), note);
    }
    Ok(())
}
