//! Parse command implementation.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use fridge_core::parse_detailed;
use tracing::debug;

/// Execute the parse command. `-` reads stdin.
pub fn execute(file: &Path, json: bool, quiet: bool) -> Result<()> {
    let text = read_text(file)?;
    debug!(chars = text.len(), "Parsing model text");

    let parsed = parse_detailed(&text);
    let degradations: Vec<String> = parsed.degradations.iter().map(|d| d.description()).collect();

    if json {
        let value = serde_json::json!({
            "result": parsed.result,
            "degradations": degradations,
        });
        let json = serde_json::to_string_pretty(&value).context("Failed to serialize result")?;
        println!("{json}");
        return Ok(());
    }

    if quiet {
        return Ok(());
    }

    super::print_result(&parsed.result);

    if !degradations.is_empty() {
        println!();
        println!("{}", "Skipped while parsing".yellow().bold());
        for description in &degradations {
            println!("   {} {}", "-".yellow(), description);
        }
    }

    Ok(())
}

fn read_text(file: &Path) -> Result<String> {
    if file == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(text);
    }

    std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read reply file: {}", file.display()))
}
