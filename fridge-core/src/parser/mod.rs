//! Grammar for the model's reply.
//!
//! The inference endpoint is told (see [`INSTRUCTION_TEMPLATE`]) to answer in a
//! fixed section format:
//!
//! ```text
//! FOUND_INGREDIENTS:
//! - eggs
//! RECIPES_START
//! RECIPE_1
//! NAME: Omelette
//! TIME: 10 minutes
//! INGREDIENTS:
//! - eggs
//! INSTRUCTIONS:
//! - Beat eggs
//! RECIPE_END
//! RECIPES_END
//! ```
//!
//! Renaming any marker is a breaking protocol change.
//!
//! ## Fallback policy
//!
//! Parsing never fails. Anything the grammar cannot place degrades the result
//! instead of raising:
//!
//! - no `FOUND_INGREDIENTS:` marker: empty ingredient list
//! - no `RECIPES_START`: no recipes
//! - a recipe block without a non-empty `NAME:`: block dropped
//! - a recipe block not closed by `RECIPE_END` (usually a reply truncated by
//!   the output cap): block dropped
//! - no `TIME:`: empty cook time
//! - recipe lines after a block's `RECIPE_END` but before the next header:
//!   ignored
//!
//! Each degradation is reported by [`parse_detailed`] and logged at debug level.

mod tokenizer;

pub use tokenizer::{tokenize, Line, Token};

use tracing::debug;

use crate::model::{Recipe, ScanResult};

/// Instruction text sent with every image. Defines the reply grammar.
pub const INSTRUCTION_TEMPLATE: &str = "Analyze this image and respond in EXACTLY this format:\n\n\
FOUND_INGREDIENTS:\n\
- ingredient1\n\
- ingredient2\n\n\
RECIPES_START\n\
RECIPE_1\n\
NAME: Recipe Name\n\
TIME: X minutes\n\
INGREDIENTS:\n\
- ingredient1\n\
- ingredient2\n\
INSTRUCTIONS:\n\
- First step\n\
- Second step\n\
RECIPE_END\n\n\
RECIPE_2\n\
... (repeat format)\n\
RECIPES_END";

/// Something the grammar had to skip or default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Degradation {
    /// No `FOUND_INGREDIENTS:` marker.
    MissingFoundIngredients,
    /// No `RECIPES_START` marker.
    MissingRecipeSection,
    /// `RECIPES_START` never followed by `RECIPES_END`.
    UnterminatedRecipeSection,
    /// Recipe block without a non-empty `NAME:`; dropped.
    UntitledRecipe { line: usize },
    /// Recipe block not closed by `RECIPE_END`; dropped.
    UnterminatedRecipe { line: usize, title: Option<String> },
    /// Recipe content after `RECIPE_END` with no `RECIPE_<n>` header before
    /// it; ignored. Usually a header the tokenizer could not recognize.
    ContentAfterRecipeEnd { line: usize },
}

impl Degradation {
    pub fn description(&self) -> String {
        match self {
            Self::MissingFoundIngredients => "no FOUND_INGREDIENTS section".to_string(),
            Self::MissingRecipeSection => "no RECIPES_START section".to_string(),
            Self::UnterminatedRecipeSection => "recipe section not closed by RECIPES_END".to_string(),
            Self::UntitledRecipe { line } => {
                format!("recipe block at line {line} has no NAME, dropped")
            }
            Self::UnterminatedRecipe { line, title } => match title {
                Some(title) => format!(
                    "recipe \"{title}\" at line {line} not closed by RECIPE_END, dropped"
                ),
                None => format!("recipe block at line {line} not closed by RECIPE_END, dropped"),
            },
            Self::ContentAfterRecipeEnd { line } => format!(
                "recipe content at line {line} follows RECIPE_END without a header, ignored"
            ),
        }
    }
}

/// Parse result together with what had to be skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedResponse {
    pub result: ScanResult,
    pub degradations: Vec<Degradation>,
}

impl ParsedResponse {
    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}

/// Parse a raw model reply into a [`ScanResult`]. Never fails.
pub fn parse(text: &str) -> ScanResult {
    parse_detailed(text).result
}

/// Parse a raw model reply, also reporting degradations.
pub fn parse_detailed(text: &str) -> ParsedResponse {
    let lines = tokenize(text);
    let mut degradations = Vec::new();

    let found_ingredients = match found_section(&lines) {
        Some(section) => items(section).map(str::to_string).collect(),
        None => {
            degradations.push(Degradation::MissingFoundIngredients);
            Vec::new()
        }
    };

    let recipes = match recipe_section(&lines) {
        Some((section, terminated)) => {
            if !terminated {
                degradations.push(Degradation::UnterminatedRecipeSection);
            }
            split_blocks(section)
                .into_iter()
                .filter_map(|block| block.build(&mut degradations))
                .collect()
        }
        None => {
            degradations.push(Degradation::MissingRecipeSection);
            Vec::new()
        }
    };

    for degradation in &degradations {
        debug!(reason = %degradation.description(), "Model reply degraded");
    }

    ParsedResponse {
        result: ScanResult {
            found_ingredients,
            recipes,
        },
        degradations,
    }
}

/// Lines after the first `FOUND_INGREDIENTS:` up to the next `RECIPES_START`
/// or repeated `FOUND_INGREDIENTS:`.
fn found_section<'l, 'a>(lines: &'l [Line<'a>]) -> Option<&'l [Line<'a>]> {
    let start = lines
        .iter()
        .position(|l| l.token == Token::FoundIngredients)?
        + 1;
    let len = lines[start..]
        .iter()
        .position(|l| matches!(l.token, Token::RecipesStart | Token::FoundIngredients))
        .unwrap_or(lines.len() - start);
    Some(&lines[start..start + len])
}

/// Lines after the first `RECIPES_START` up to the next `RECIPES_END`, and
/// whether that terminator was found.
fn recipe_section<'l, 'a>(lines: &'l [Line<'a>]) -> Option<(&'l [Line<'a>], bool)> {
    let start = lines.iter().position(|l| l.token == Token::RecipesStart)? + 1;
    let end = lines[start..]
        .iter()
        .position(|l| matches!(l.token, Token::RecipesEnd | Token::RecipesStart));

    match end {
        Some(len) => {
            let terminated = lines[start + len].token == Token::RecipesEnd;
            Some((&lines[start..start + len], terminated))
        }
        None => Some((&lines[start..], false)),
    }
}

fn items<'l, 'a: 'l>(lines: &'l [Line<'a>]) -> impl Iterator<Item = &'a str> + 'l {
    lines.iter().filter_map(|l| match l.token {
        Token::Item(text) => Some(text),
        _ => None,
    })
}

/// Split the recipe section on `RECIPE_<n>` headers. Lines before the first
/// header form a block of their own. Blocks with no structural line are
/// dropped silently.
fn split_blocks<'l, 'a>(section: &'l [Line<'a>]) -> Vec<Block<'l, 'a>> {
    let mut blocks = Vec::new();
    let mut start = 0;
    let mut start_line = section.first().map(|l| l.number).unwrap_or(0);

    for (i, line) in section.iter().enumerate() {
        if let Token::RecipeHeader(_) = line.token {
            blocks.push(Block {
                line: start_line,
                lines: &section[start..i],
            });
            start = i + 1;
            start_line = line.number;
        }
    }
    blocks.push(Block {
        line: start_line,
        lines: &section[start..],
    });

    blocks
        .into_iter()
        .filter(|b| b.lines.iter().any(|l| l.token.is_structural()))
        .collect()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum List {
    None,
    Ingredients,
    Instructions,
}

struct Block<'l, 'a> {
    /// Header line, or first line for a headerless block.
    line: usize,
    lines: &'l [Line<'a>],
}

impl Block<'_, '_> {
    fn build(&self, degradations: &mut Vec<Degradation>) -> Option<Recipe> {
        let mut title: Option<&str> = None;
        let mut cook_time: Option<&str> = None;
        let mut ingredients = Vec::new();
        let mut instructions = Vec::new();
        let mut list = List::None;
        let mut closed = false;

        for (i, line) in self.lines.iter().enumerate() {
            match line.token {
                Token::RecipeEnd => {
                    closed = true;
                    let rest = &self.lines[i + 1..];
                    if let Some(stray) = rest.iter().find(|l| l.token.is_structural()) {
                        degradations.push(Degradation::ContentAfterRecipeEnd {
                            line: stray.number,
                        });
                    }
                    break;
                }
                Token::Name(value) if title.is_none() && !value.is_empty() => title = Some(value),
                Token::Time(value) if cook_time.is_none() && !value.is_empty() => {
                    cook_time = Some(value)
                }
                Token::Ingredients => list = List::Ingredients,
                Token::Instructions => list = List::Instructions,
                Token::Item(text) => match list {
                    List::Ingredients => ingredients.push(text.to_string()),
                    List::Instructions if !text.is_empty() => {
                        instructions.push(text.to_string())
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        if !closed {
            degradations.push(Degradation::UnterminatedRecipe {
                line: self.line,
                title: title.map(str::to_string),
            });
            return None;
        }

        let Some(title) = title else {
            degradations.push(Degradation::UntitledRecipe { line: self.line });
            return None;
        };

        Some(Recipe {
            title: title.to_string(),
            cook_time: cook_time.unwrap_or_default().to_string(),
            ingredients,
            instructions,
        })
    }
}
