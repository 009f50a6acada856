#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::doc_markdown,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::needless_pass_by_value,
    clippy::too_many_lines,
    clippy::uninlined_format_args
)]

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use deep_research::search::{self, SearchProvider};
use deep_research::util::log_preview;
use deep_research::{AnswerResult, Config, ResearchAgent};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// `deep-research` - question answering with optional live web search.
#[derive(Parser, Debug)]
#[command(name = "deep-research")]
#[command(version)]
#[command(about = "Answer questions with an LLM, searching the web when needed.", long_about = None)]
struct Cli {
    /// Path to config.toml (default: $DEEP_RESEARCH_CONFIG or ~/.deep-research/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Bind host (default: from config)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (default: from config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Answer a single question and exit
    Ask {
        /// The question to answer
        question: String,

        /// Never search the web; answer from model knowledge only
        #[arg(long)]
        no_search: bool,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a raw web search and print the listings
    Search {
        /// Search query
        query: String,

        /// Number of results to request
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is normal; real environment variables still apply.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging - respects RUST_LOG env var, defaults to INFO.
    // Logs go to stderr so `ask --json` output stays machine-readable.
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::load(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.gateway.host.clone());
            let port = port.unwrap_or(config.gateway.port);
            info!("Starting deep research gateway on {host}:{port}");
            deep_research::gateway::run_gateway(&host, port, config).await
        }

        Commands::Ask {
            question,
            no_search,
            json,
        } => {
            if question.trim().is_empty() {
                bail!("Question cannot be empty");
            }
            let agent = ResearchAgent::from_config(&config)?;
            info!(model = agent.model(), "Asking: {}", log_preview(&question));
            let result = agent.answer(&question, !no_search).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_answer(&result);
            }
            Ok(())
        }

        Commands::Search { query, count } => {
            if query.trim().is_empty() {
                bail!("Search query cannot be empty");
            }
            let backend = search::create_search_provider(&config.search)?;
            let results = match count {
                Some(count) => backend.search(&query, count.max(1)).await?,
                None => backend.search_default(&query).await?,
            };
            if results.is_empty() {
                println!("No results.");
            }
            for (i, result) in results.iter().enumerate() {
                println!("{}. {}\n   {}", i + 1, result.title, result.url);
                if !result.description.is_empty() {
                    println!("   {}", result.description);
                }
            }
            Ok(())
        }
    }
}

fn print_answer(result: &AnswerResult) {
    println!("{}", result.answer);
    if result.search_results.is_empty() {
        return;
    }
    println!("\nSources:");
    for (i, source) in result.search_results.iter().enumerate() {
        println!("  {}. {} - {}", i + 1, source.title, source.url);
    }
}
