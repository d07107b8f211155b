//! Ask a question over the ingested knowledge.

use anyhow::{Context, Result};
use colored::Colorize;

use crate::commands::build_context;
use crate::config::TrellisConfig;
use trellis_rag::Retriever;

pub async fn run(config: &TrellisConfig, query: &str, show_context: bool) -> Result<()> {
    let ctx = build_context(config)?;
    let retriever = Retriever::new(ctx, config.retrieval);

    println!("{} Retrieving context for {}...", "→".blue(), query.cyan());

    let report = retriever
        .retrieve(query)
        .await
        .context("Retrieval failed")?;

    if report.is_no_context() {
        println!();
        println!("{} {}", "•".yellow(), report.answer);
        return Ok(());
    }

    if show_context {
        println!();
        println!("{}", "Context".blue().bold());
        println!(
            "  Seeds:  {}",
            report
                .seeds
                .iter()
                .map(|seed| format!("{:.3}", seed.score))
                .collect::<Vec<_>>()
                .join(", ")
                .dimmed()
        );
        println!("  Nodes:  {}", report.context.nodes.join(", ").dimmed());
        for edge in &report.context.edges {
            println!("    {}", edge.dimmed());
        }
    }

    println!();
    println!(
        "{} Grounded on {} seeds, {} triples",
        "✓".green(),
        report.seeds.len().to_string().cyan(),
        report.subgraph.len().to_string().cyan()
    );
    println!();
    println!("{}", report.answer);

    Ok(())
}
