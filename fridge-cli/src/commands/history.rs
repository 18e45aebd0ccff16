//! History command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::utils;

/// Execute the history command.
pub fn execute(data_dir: PathBuf, json: bool, limit: Option<usize>, quiet: bool) -> Result<()> {
    let history = utils::open_history(data_dir);
    let limit = limit.unwrap_or(usize::MAX);
    let entries: Vec<_> = history.list().iter().take(limit).collect();

    if json {
        let json =
            serde_json::to_string_pretty(&entries).context("Failed to serialize history")?;
        println!("{json}");
        return Ok(());
    }

    if quiet {
        return Ok(());
    }

    if entries.is_empty() {
        println!("{}", "No scans yet".dimmed());
        return Ok(());
    }

    for entry in entries {
        println!(
            "{}  {}  {} ingredients",
            utils::short_id(&entry.id).cyan(),
            utils::format_timestamp(entry.timestamp),
            entry.found_ingredients.len()
        );
        if !entry.found_ingredients.is_empty() {
            println!("   {}", entry.found_ingredients.join(", ").dimmed());
        }
        let titles: Vec<&str> = entry.recipes.iter().map(|r| r.title.as_str()).collect();
        if !titles.is_empty() {
            println!("   {} {}", "Recipes:".dimmed(), titles.join(", ").green());
        }
    }

    Ok(())
}
