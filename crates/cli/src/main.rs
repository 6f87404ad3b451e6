//! SiteQA CLI
//!
//! Main entry point for the `siteqa` command-line tool.
//! Crawls a website, indexes it into a local vector collection and answers
//! questions grounded in that content, either directly or over HTTP.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, CrawlCommand, IndexCommand, ServeCommand, StatsCommand};
use siteqa_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// SiteQA - ask questions about a website, answered from its own pages
#[derive(Parser, Debug)]
#[command(name = "siteqa")]
#[command(about = "Grounded question answering over a crawled website", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "SITEQA_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "SITEQA_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Emit logs as JSON records
    #[arg(long, global = true)]
    log_json: bool,

    /// LLM provider used for answers
    #[arg(short, long, global = true, env = "SITEQA_LLM_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "SITEQA_LLM_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP service
    Serve(ServeCommand),

    /// Crawl a website into the snapshot
    Crawl(CrawlCommand),

    /// Rebuild the vector collection from the snapshot
    Index(IndexCommand),

    /// Ask a question about the indexed website
    Ask(AskCommand),

    /// Show collection statistics
    Stats(StatsCommand),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Serve(_) => "serve",
            Commands::Crawl(_) => "crawl",
            Commands::Index(_) => "index",
            Commands::Ask(_) => "ask",
            Commands::Stats(_) => "stats",
        }
    }
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Explicit workspace/config decide which YAML file is read
    let config = AppConfig::load_from(cli.workspace, cli.config)?;

    let mut config = config.with_overrides(
        None,
        None,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    if cli.log_json {
        config.log_json = true;
    }

    logging::init_logging(&config)?;

    tracing::info!("SiteQA starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("LLM: {} ({})", config.llm.provider, config.llm.model);
    tracing::debug!("Embeddings: {}", config.embedding.provider);

    let _span = tracing::info_span!("command", name = cli.command.name()).entered();

    let result = match cli.command {
        Commands::Serve(cmd) => cmd.execute(&config).await,
        Commands::Crawl(cmd) => cmd.execute(&config).await,
        Commands::Index(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Stats(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ask_with_global_flags() {
        let cli = Cli::try_parse_from([
            "siteqa",
            "ask",
            "What is Alpha?",
            "--top-k",
            "3",
            "--model",
            "mistral",
        ])
        .unwrap();

        assert_eq!(cli.model.as_deref(), Some("mistral"));
        match cli.command {
            Commands::Ask(cmd) => {
                assert_eq!(cmd.question, "What is Alpha?");
                assert_eq!(cmd.top_k, Some(3));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_crawl_max_pages() {
        let cli =
            Cli::try_parse_from(["siteqa", "crawl", "https://example.com", "--max-pages", "5"])
                .unwrap();
        assert_eq!(cli.command.name(), "crawl");
        match cli.command {
            Commands::Crawl(cmd) => {
                assert_eq!(cmd.start_url, "https://example.com");
                assert_eq!(cmd.max_pages, Some(5));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_crawl_requires_url() {
        assert!(Cli::try_parse_from(["siteqa", "crawl"]).is_err());
    }
}
