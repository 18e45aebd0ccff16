//! Subcommand implementations and shared rendering.

pub mod history;
pub mod parse;
pub mod scan;
pub mod show;

use colored::Colorize;
use fridge_core::{Recipe, ScanResult};

/// Print found ingredients and recipe cards.
pub(crate) fn print_result(result: &ScanResult) {
    println!("{}", "Found ingredients".bold());
    if result.found_ingredients.is_empty() {
        println!("   {}", "(none)".dimmed());
    } else {
        println!("   {}", result.found_ingredients.join(", "));
    }

    println!();
    if result.recipes.is_empty() {
        println!("{}", "No recipes suggested".yellow());
        return;
    }

    println!("{}", "Recipes".bold());
    for (index, recipe) in result.recipes.iter().enumerate() {
        print_recipe_card(index + 1, recipe);
    }
}

/// One-line recipe summary with its ingredient list.
fn print_recipe_card(number: usize, recipe: &Recipe) {
    let time = if recipe.cook_time.is_empty() {
        String::new()
    } else {
        format!(" ({})", recipe.cook_time)
    };
    println!("   {}. {}{}", number, recipe.title.green(), time.dimmed());
    if !recipe.ingredients.is_empty() {
        println!("      {}", recipe.ingredients.join(", ").dimmed());
    }
}

/// Full recipe with numbered steps.
pub(crate) fn print_recipe_detail(recipe: &Recipe) {
    println!("{}", recipe.title.green().bold());
    if !recipe.cook_time.is_empty() {
        println!("   {} {}", "Time:".dimmed(), recipe.cook_time);
    }

    println!();
    println!("{}", "Ingredients".bold());
    for ingredient in &recipe.ingredients {
        println!("   - {ingredient}");
    }

    println!();
    println!("{}", "Instructions".bold());
    for (step, instruction) in recipe.instructions.iter().enumerate() {
        println!("   {}. {}", step + 1, instruction);
    }
}
