//! Trellis CLI - graph-grounded retrieval over extracted knowledge.

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::TrellisConfig;

#[derive(Parser)]
#[command(name = "trellis")]
#[command(author, version, about = "Trellis - Hybrid graph and vector retrieval", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default trellis.toml in the current directory
    Init {
        /// Overwrite an existing trellis.toml
        #[arg(long)]
        force: bool,
    },

    /// Ingest a document into the knowledge base
    Ingest {
        /// File to ingest, or "-" for stdin
        input: String,
    },

    /// Ask a question over the ingested knowledge
    Ask {
        /// The question
        query: String,

        /// Print seeds and subgraph context before the answer
        #[arg(long)]
        show_context: bool,
    },

    /// Show knowledge base statistics
    Stats,

    /// Check connectivity of every configured service
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init { force } => commands::init::run(force),
        Commands::Ingest { input } => {
            let config = TrellisConfig::load()?;
            commands::ingest::run(&config, &input).await
        }
        Commands::Ask {
            query,
            show_context,
        } => {
            let config = TrellisConfig::load()?;
            commands::ask::run(&config, &query, show_context).await
        }
        Commands::Stats => {
            let config = TrellisConfig::load()?;
            commands::stats::run(&config).await
        }
        Commands::Check => {
            let config = TrellisConfig::load()?;
            commands::check::run(&config).await
        }
    }
}
