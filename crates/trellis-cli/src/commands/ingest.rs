//! Ingest a document into the knowledge base.

use anyhow::{anyhow, bail, Context, Result};
use colored::Colorize;
use std::io::Read;
use std::path::Path;

use crate::commands::build_context;
use crate::config::TrellisConfig;
use trellis_rag::IngestPipeline;

pub async fn run(config: &TrellisConfig, input: &str) -> Result<()> {
    let text = read_input(input)?;
    if text.trim().is_empty() {
        bail!("Input is empty");
    }

    let ctx = build_context(config)?;
    let pipeline = IngestPipeline::new(ctx, config.ingestion);

    println!(
        "{} Ingesting {} ({} lines)...",
        "→".blue(),
        source_label(input).cyan(),
        text.lines().filter(|l| !l.trim().is_empty()).count()
    );

    let report = pipeline
        .ingest(&text)
        .await
        .map_err(|err| anyhow!("ingestion failed at step {}: {err}", err.step()))?;

    println!();
    println!("{} Ingestion complete!", "✓".green().bold());
    println!(
        "  Triples extracted:   {}",
        report.triples_extracted.to_string().cyan()
    );
    if report.triples_skipped > 0 {
        println!(
            "  Triples skipped:     {}",
            report.triples_skipped.to_string().yellow()
        );
    }
    println!(
        "  Entities:            {}",
        report.entities.to_string().cyan()
    );
    println!(
        "  Relationships:       {}",
        report.relationships.to_string().cyan()
    );
    if report.relationships_skipped > 0 {
        println!(
            "  Relationships skipped: {}",
            report.relationships_skipped.to_string().yellow()
        );
    }
    println!(
        "  Chunks embedded:     {}",
        report.chunks_embedded.to_string().cyan()
    );
    if report.chunks_skipped > 0 {
        println!(
            "  Chunks skipped:      {}",
            report.chunks_skipped.to_string().yellow()
        );
    }

    Ok(())
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read from stdin")?;
        return Ok(text);
    }

    let path = Path::new(input);
    if !path.exists() {
        bail!("File does not exist: {}", path.display());
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read: {}", path.display()))
}

fn source_label(input: &str) -> &str {
    if input == "-" {
        "stdin"
    } else {
        input
    }
}
