//! Check connectivity of every configured service.

use anyhow::{bail, Result};
use colored::Colorize;

use crate::commands::build_context;
use crate::config::TrellisConfig;
use trellis_embeddings::Embedder;
use trellis_graph::GraphStore;
use trellis_llm::LlmBackend;
use trellis_vectors::VectorStore;

pub async fn run(config: &TrellisConfig) -> Result<()> {
    let ctx = build_context(config)?;

    println!("{} Checking configured services...", "→".blue());
    println!();

    let mut all_ok = true;
    all_ok &= report("LLM", ctx.llm.name(), ctx.llm.health_check().await);
    all_ok &= report(
        "Embedder",
        ctx.embedder.model_name(),
        ctx.embedder.health_check().await,
    );
    all_ok &= report("Graph store", ctx.graph.name(), ctx.graph.health_check().await);
    all_ok &= report(
        "Vector store",
        ctx.vectors.name(),
        ctx.vectors.health_check().await,
    );

    println!();
    if all_ok {
        println!("{} All services reachable", "✓".green().bold());
        Ok(())
    } else {
        bail!("One or more services failed the connectivity check");
    }
}

fn report<E: std::fmt::Display>(label: &str, name: &str, result: Result<bool, E>) -> bool {
    match result {
        Ok(true) => {
            println!("  {} {:<13} {}", "✓".green(), label, name.dimmed());
            true
        }
        Ok(false) => {
            println!("  {} {:<13} {} unreachable", "✗".red(), label, name.dimmed());
            false
        }
        Err(err) => {
            println!("  {} {:<13} {}", "✗".red(), label, err);
            false
        }
    }
}
