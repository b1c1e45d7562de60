//! Trait Analyzer Server
//!
//! Runs the trait analysis API as a standalone HTTP server.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use trait_analyzer::llm_client::{
    ANTHROPIC_API_BASE, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS,
};
use trait_analyzer::{run_server, AppState, LlmConfig, PromptCatalog};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "trait-analyzer-server")]
#[command(about = "LLM-backed personality trait analysis API")]
struct Args {
    /// Server port
    #[arg(short, long, default_value_t = 3000, env = "PORT")]
    port: u16,

    /// Server host
    #[arg(long, default_value = "0.0.0.0", env = "HOST")]
    host: String,

    /// Provider API key
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Provider base URL
    #[arg(long, default_value = ANTHROPIC_API_BASE, env = "ANTHROPIC_API_BASE")]
    api_base: String,

    /// Model used for analysis
    #[arg(long, default_value = DEFAULT_MODEL, env = "ANALYSIS_MODEL")]
    model: String,

    /// Output token budget per analysis
    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS, env = "ANALYSIS_MAX_TOKENS")]
    max_tokens: u32,

    /// Provider request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, env = "ANALYSIS_TIMEOUT_SECS")]
    timeout_secs: u64,

    /// TOML file with `[[prompts]]` presets (built-in presets when unset)
    #[arg(long, env = "PROMPTS_FILE")]
    prompts_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("trait_analyzer=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .init();

    let args = Args::parse();

    info!("Starting Trait Analyzer Server");
    info!("  Model: {} (max_tokens={})", args.model, args.max_tokens);
    info!("  Provider: {}", args.api_base);

    if args.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
        warn!("ANTHROPIC_API_KEY is not set; /api/analyze will answer 500 until it is");
    }

    let prompts = match &args.prompts_file {
        Some(path) => {
            info!("  Prompts file: {}", path.display());
            PromptCatalog::from_file(path)?
        }
        None => PromptCatalog::default(),
    };

    let llm = LlmConfig {
        api_base: args.api_base,
        api_key: args.api_key,
        model: args.model,
        max_tokens: args.max_tokens,
        timeout_secs: args.timeout_secs,
    };

    let state = AppState::from_config(llm, prompts).context("Failed to build LLM client")?;

    // Blocks until shutdown
    run_server(state, &args.host, args.port).await?;

    Ok(())
}
