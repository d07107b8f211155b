//! Show knowledge base statistics.

use anyhow::Result;
use colored::Colorize;

use crate::commands::build_context;
use crate::config::TrellisConfig;
use trellis_graph::GraphStore;
use trellis_vectors::VectorStore;

pub async fn run(config: &TrellisConfig) -> Result<()> {
    let ctx = build_context(config)?;

    let nodes = ctx.graph.node_count().await?;
    let relationships = ctx.graph.relationship_count().await?;
    let points = match ctx.vectors.count().await {
        Ok(count) => count.to_string(),
        Err(err) => format!("unavailable ({err})"),
    };

    println!("{}", "Trellis Knowledge Base".white().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!();

    println!("{}", "Graph".blue().bold());
    println!("  Backend:         {}", ctx.graph.name().dimmed());
    println!("  Entities:        {}", nodes.to_string().cyan());
    println!("  Relationships:   {}", relationships.to_string().cyan());
    println!();

    println!("{}", "Vectors".blue().bold());
    println!("  Backend:         {}", ctx.vectors.name().dimmed());
    println!(
        "  Collection:      {}",
        config.vectors.collection.as_str().dimmed()
    );
    println!("  Points:          {}", points.cyan());
    println!();

    println!("{}", "═".repeat(40).dimmed());

    Ok(())
}
