//! Show command implementation.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use fridge_core::HistoryEntry;

use crate::utils;

/// Execute the show command.
pub fn execute(
    data_dir: PathBuf,
    id: &str,
    recipe: Option<usize>,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let history = utils::open_history(data_dir);
    let entry = find_entry(history.list(), id)?;

    if let Some(number) = recipe {
        let Some(recipe) = number.checked_sub(1).and_then(|i| entry.recipes.get(i)) else {
            bail!(
                "Scan {} has {} recipe(s); no recipe {}",
                utils::short_id(&entry.id),
                entry.recipes.len(),
                number
            );
        };

        if json {
            let json = serde_json::to_string_pretty(recipe).context("Failed to serialize recipe")?;
            println!("{json}");
        } else if !quiet {
            super::print_recipe_detail(recipe);
        }
        return Ok(());
    }

    if json {
        let json = serde_json::to_string_pretty(entry).context("Failed to serialize entry")?;
        println!("{json}");
    } else if !quiet {
        println!(
            "{}  {}",
            entry.id.cyan(),
            utils::format_timestamp(entry.timestamp).dimmed()
        );
        println!();
        super::print_result(&entry.result());
    }

    Ok(())
}

/// Exact id match, else a unique prefix.
fn find_entry<'a>(entries: &'a [HistoryEntry], id: &str) -> Result<&'a HistoryEntry> {
    if let Some(entry) = entries.iter().find(|e| e.id == id) {
        return Ok(entry);
    }

    let mut matches = entries.iter().filter(|e| !id.is_empty() && e.id.starts_with(id));
    match (matches.next(), matches.next()) {
        (Some(entry), None) => Ok(entry),
        (Some(_), Some(_)) => bail!("Scan id '{id}' is ambiguous; give more characters"),
        (None, _) => bail!("No scan with id '{id}'"),
    }
}
