use anyhow::{Context, Result};
use clap::Parser;
use crossterm::tty::IsTty;
use std::path::PathBuf;
use supportbot_core::{CompletionMode, Settings};

mod app;
mod commands;
mod theme;

use theme::Theme;

#[derive(Parser)]
#[command(name = "supportbot")]
#[command(about = "supportbot - Odoo post-implementation support assistant")]
#[command(version)]
struct Cli {
    /// Ask a single question and exit
    #[arg(short, long)]
    prompt: Option<String>,

    /// LLM model to use
    #[arg(short, long)]
    model: Option<String>,

    /// LLM provider (openai, groq, together, openrouter, ollama, lmstudio)
    #[arg(long)]
    provider: Option<String>,

    /// Industry to start with, skipping the selection step
    #[arg(short, long)]
    industry: Option<String>,

    /// Wait for whole replies instead of streaming them
    #[arg(long)]
    batch: bool,

    /// Settings file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Color theme (dark, light, plain); plain when stdout is not a terminal
    #[arg(long)]
    theme: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut settings = match cli.config {
        Some(ref path) => Settings::load_from(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::load(),
    };

    if let Some(ref provider) = cli.provider {
        settings.llm.provider = provider.clone();
    }
    if let Some(ref model) = cli.model {
        settings.llm.model = Some(model.clone());
    }
    if cli.batch {
        settings.llm.mode = CompletionMode::Batch;
    }

    let theme = match cli.theme {
        Some(ref name) => Theme::by_name(name),
        None if std::io::stdout().is_tty() => Theme::dark(),
        None => Theme::plain(),
    };

    let industry = cli.industry.as_deref();
    if let Some(prompt) = cli.prompt {
        app::run_single_prompt(&settings, &prompt, industry, theme).await?;
    } else {
        app::run_repl(settings, industry, theme).await?;
    }

    Ok(())
}
