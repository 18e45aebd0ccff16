//! Adversarial replies for the reply grammar.
//!
//! Models drift from the requested format: they add chatter, wrap the reply
//! in markdown fences, get cut off by the output cap, or ignore the format
//! entirely. None of that may make parsing fail.

use fridge_core::{parse, parse_detailed, Degradation, Recipe};

const OMELETTE: &str = "FOUND_INGREDIENTS:
- eggs
- milk
RECIPES_START
RECIPE_1
NAME: Omelette
TIME: 10 minutes
INGREDIENTS:
- eggs
- milk
INSTRUCTIONS:
- Beat eggs
- Cook on pan
RECIPE_END
RECIPES_END
";

fn omelette() -> Recipe {
    Recipe {
        title: "Omelette".into(),
        cook_time: "10 minutes".into(),
        ingredients: vec!["eggs".into(), "milk".into()],
        instructions: vec!["Beat eggs".into(), "Cook on pan".into()],
    }
}

fn recipe_block(n: usize) -> String {
    format!(
        "RECIPE_{n}\nNAME: Dish {n}\nTIME: {n} minutes\nINGREDIENTS:\n- item {n}\n\
         INSTRUCTIONS:\n- Step {n}\nRECIPE_END\n"
    )
}

// ============================================================================
// Format drift
// ============================================================================

#[test]
fn test_refusal_yields_empty_result() {
    let parsed = parse_detailed("I'm sorry, I can't identify any food in this image.");

    assert!(parsed.result.is_empty());
    assert!(parsed
        .degradations
        .contains(&Degradation::MissingFoundIngredients));
    assert!(parsed
        .degradations
        .contains(&Degradation::MissingRecipeSection));
}

#[test]
fn test_empty_and_whitespace_input() {
    for text in ["", "\n\n\n", "   \t  \r\n  "] {
        let result = parse(text);
        assert!(result.found_ingredients.is_empty());
        assert!(result.recipes.is_empty());
    }
}

#[test]
fn test_markers_only() {
    let parsed = parse_detailed("FOUND_INGREDIENTS:\nRECIPES_START\nRECIPES_END\n");
    assert!(parsed.result.is_empty());
    assert!(!parsed.is_degraded(), "{:?}", parsed.degradations);
}

#[test]
fn test_chatter_and_markdown_fences() {
    let text = format!(
        "Sure! Here is what I can see in your fridge:\n\n```\n{OMELETTE}```\n\nEnjoy your meal!"
    );
    let result = parse(&text);

    assert_eq!(result.found_ingredients, vec!["eggs", "milk"]);
    assert_eq!(result.recipes, vec![omelette()]);
}

#[test]
fn test_crlf_line_endings() {
    let text = OMELETTE.replace('\n', "\r\n");
    let result = parse(&text);

    assert_eq!(result.found_ingredients, vec!["eggs", "milk"]);
    assert_eq!(result.recipes, vec![omelette()]);
}

#[test]
fn test_indented_reply() {
    let text: String = OMELETTE.lines().map(|l| format!("    {l}\n")).collect();
    assert_eq!(parse(&text).recipes, vec![omelette()]);
}

#[test]
fn test_unicode_content() {
    let text = "FOUND_INGREDIENTS:
- crème fraîche
- 豆腐
RECIPES_START
RECIPE_1
NAME: Œufs brouillés
TIME: 5 minutes
INGREDIENTS:
- crème fraîche
INSTRUCTIONS:
- Remuer doucement 🍳
RECIPE_END
RECIPES_END";
    let result = parse(text);

    assert_eq!(result.found_ingredients, vec!["crème fraîche", "豆腐"]);
    assert_eq!(result.recipes[0].title, "Œufs brouillés");
    assert_eq!(result.recipes[0].instructions, vec!["Remuer doucement 🍳"]);
}

#[test]
fn test_markers_are_case_sensitive() {
    let text = OMELETTE.to_lowercase();
    let result = parse(&text);
    assert!(result.is_empty());
}

#[test]
fn test_repeated_found_ingredients_uses_first() {
    let text = "FOUND_INGREDIENTS:\n- eggs\nFOUND_INGREDIENTS:\n- caviar\nRECIPES_START\nRECIPES_END";
    assert_eq!(parse(text).found_ingredients, vec!["eggs"]);
}

#[test]
fn test_text_after_recipes_end_ignored() {
    let text = format!("{OMELETTE}{}", recipe_block(2));
    assert_eq!(parse(&text).recipes, vec![omelette()]);
}

#[test]
fn test_bold_found_ingredients_marker() {
    let result = parse("**FOUND_INGREDIENTS:**\n- eggs\n- milk\nRECIPES_START\nRECIPES_END");
    assert_eq!(result.found_ingredients, vec!["eggs", "milk"]);
}

#[test]
fn test_markdown_heading_recipe_headers() {
    let text = "FOUND_INGREDIENTS:
- eggs
RECIPES_START
### RECIPE_1
NAME: A
INGREDIENTS:
- eggs
INSTRUCTIONS:
- Cook
RECIPE_END
### RECIPE_2
NAME: B
INGREDIENTS:
- eggs
INSTRUCTIONS:
- Bake
RECIPE_END
RECIPES_END";
    let parsed = parse_detailed(text);

    let titles: Vec<&str> = parsed.result.recipes.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "B"]);
    assert!(!parsed.is_degraded(), "{:?}", parsed.degradations);
}

#[test]
fn test_numbered_name_line() {
    let text = OMELETTE.replace("NAME: Omelette", "1. NAME: Omelette");
    assert_eq!(parse(&text).recipes, vec![omelette()]);
}

#[test]
fn test_fully_decorated_reply() {
    let text = "**FOUND_INGREDIENTS:**
- eggs
- milk
**RECIPES_START**
**RECIPE_1:**
**NAME:** Omelette
**TIME:** 10 minutes
**INGREDIENTS:**
- eggs
- milk
**INSTRUCTIONS:**
- Beat eggs
- Cook on pan
**RECIPE_END**
**RECIPES_END**";
    let parsed = parse_detailed(text);

    assert_eq!(parsed.result.found_ingredients, vec!["eggs", "milk"]);
    assert_eq!(parsed.result.recipes, vec![omelette()]);
    assert!(!parsed.is_degraded(), "{:?}", parsed.degradations);
}

#[test]
fn test_unrecognized_header_reported_not_silent() {
    let text = "RECIPES_START
RECIPE_1
NAME: A
RECIPE_END
Recipe two
NAME: B
RECIPE_END
RECIPES_END";
    let parsed = parse_detailed(text);

    assert_eq!(parsed.result.recipes.len(), 1);
    assert!(parsed
        .degradations
        .iter()
        .any(|d| matches!(d, Degradation::ContentAfterRecipeEnd { .. })));
}

// ============================================================================
// Truncation by the output cap
// ============================================================================

#[test]
fn test_truncated_second_recipe_dropped() {
    let text = "FOUND_INGREDIENTS:
- flour
RECIPES_START
RECIPE_1
NAME: Crepes
TIME: 20 minutes
INGREDIENTS:
- flour
INSTRUCTIONS:
- Whisk
RECIPE_END
RECIPE_2
NAME: Pancakes
TIME: 15 min";
    let parsed = parse_detailed(text);

    assert_eq!(parsed.result.recipes.len(), 1);
    assert_eq!(parsed.result.recipes[0].title, "Crepes");
    assert!(parsed
        .degradations
        .contains(&Degradation::UnterminatedRecipeSection));
    assert!(parsed.degradations.iter().any(|d| matches!(
        d,
        Degradation::UnterminatedRecipe { title: Some(t), .. } if t == "Pancakes"
    )));
}

#[test]
fn test_every_prefix_parses() {
    let mut cut = 0;
    while cut <= OMELETTE.len() {
        let prefix = &OMELETTE[..cut];
        let result = parse(prefix);

        assert!(result.recipes.len() <= 1, "prefix {cut}");
        assert!(result.found_ingredients.len() <= 2, "prefix {cut}");
        if let Some(recipe) = result.recipes.first() {
            assert_eq!(recipe, &omelette(), "prefix {cut}");
        }
        cut += 1;
    }

    // The recipe only appears once its RECIPE_END line is complete
    let end = OMELETTE.find("RECIPE_END").unwrap();
    assert!(parse(&OMELETTE[..end]).recipes.is_empty());
    assert_eq!(parse(&OMELETTE[..end + "RECIPE_END".len()]).recipes.len(), 1);
}

// ============================================================================
// Scale and stability
// ============================================================================

#[test]
fn test_many_recipes_in_order() {
    let blocks: String = (1..=500).map(recipe_block).collect();
    let text = format!("FOUND_INGREDIENTS:\n- water\nRECIPES_START\n{blocks}RECIPES_END\n");
    let result = parse(&text);

    assert_eq!(result.recipes.len(), 500);
    for (i, recipe) in result.recipes.iter().enumerate() {
        assert_eq!(recipe.title, format!("Dish {}", i + 1));
    }
}

#[test]
fn test_long_lines() {
    let long = "x".repeat(100_000);
    let text = format!("FOUND_INGREDIENTS:\n- {long}\n{long}\nRECIPES_START\nRECIPES_END");
    let result = parse(&text);

    assert_eq!(result.found_ingredients.len(), 1);
    assert_eq!(result.found_ingredients[0].len(), 100_000);
}

#[test]
fn test_parse_is_idempotent_on_noise() {
    let inputs = [
        OMELETTE.to_string(),
        "RECIPE_END\nRECIPE_END\nRECIPES_END\nRECIPES_START".to_string(),
        "NAME:\nTIME:\n-\n- \n--\nINGREDIENTS: INSTRUCTIONS:".to_string(),
        "RECIPES_START\nRECIPE_99999999999999999999\nNAME: Overflow\nRECIPE_END".to_string(),
    ];

    for input in &inputs {
        assert_eq!(parse_detailed(input), parse_detailed(input));
    }
}
