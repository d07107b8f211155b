//! Write a default trellis.toml.

use anyhow::{Context, Result};
use colored::Colorize;

use crate::config::DEFAULT_CONFIG;

pub fn run(force: bool) -> Result<()> {
    let path = std::env::current_dir()?.join("trellis.toml");

    if path.exists() && !force {
        println!(
            "{} {} already exists (use {} to overwrite)",
            "•".yellow(),
            path.display(),
            "--force".cyan()
        );
        return Ok(());
    }

    std::fs::write(&path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("{} Created {}", "✓".green(), path.display());

    println!();
    println!("Next steps:");
    println!(
        "  {} edit trellis.toml (backends default to in-memory)",
        "1.".blue()
    );
    println!("  {} trellis check", "2.".blue());
    println!("  {} trellis ingest <file>", "3.".blue());
    println!("  {} trellis ask \"your question\"", "4.".blue());

    Ok(())
}
