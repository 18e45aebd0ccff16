//! Records produced by a scan and kept in history.
//!
//! Field names serialize in camelCase so history blobs written by the
//! browser version of the app load unchanged.

use serde::{Deserialize, Serialize};

/// A recipe suggested by the model. Every field is best-effort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Recipe {
    pub title: String,
    /// Free text, e.g. "20 minutes". Empty when the model gave no TIME tag.
    pub cook_time: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
}

/// Ingredients and recipes recovered from one model reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScanResult {
    pub found_ingredients: Vec<String>,
    pub recipes: Vec<Recipe>,
}

impl ScanResult {
    /// True when nothing at all was recovered.
    pub fn is_empty(&self) -> bool {
        self.found_ingredients.is_empty() && self.recipes.is_empty()
    }
}

/// A [`ScanResult`] tagged with identity and capture time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    /// Unix timestamp in milliseconds.
    pub timestamp: i64,
    #[serde(default)]
    pub found_ingredients: Vec<String>,
    #[serde(default)]
    pub recipes: Vec<Recipe>,
}

impl HistoryEntry {
    pub fn new(id: String, timestamp: i64, result: ScanResult) -> Self {
        Self {
            id,
            timestamp,
            found_ingredients: result.found_ingredients,
            recipes: result.recipes,
        }
    }

    /// The scan data without identity.
    pub fn result(&self) -> ScanResult {
        ScanResult {
            found_ingredients: self.found_ingredients.clone(),
            recipes: self.recipes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_serializes_camel_case() {
        let recipe = Recipe {
            title: "Omelette".into(),
            cook_time: "10 minutes".into(),
            ingredients: vec!["eggs".into()],
            instructions: vec!["Beat eggs".into()],
        };
        let json = serde_json::to_value(&recipe).unwrap();
        assert_eq!(json["cookTime"], "10 minutes");
        assert!(json.get("cook_time").is_none());
    }

    #[test]
    fn test_history_entry_accepts_browser_format() {
        let blob = r#"{
            "id": "1718000000000",
            "timestamp": 1718000000000,
            "foundIngredients": ["eggs", "milk"],
            "recipes": [{"title": "Omelette", "cookTime": "10 minutes",
                         "ingredients": ["eggs"], "instructions": ["Beat eggs"]}]
        }"#;
        let entry: HistoryEntry = serde_json::from_str(blob).unwrap();
        assert_eq!(entry.id, "1718000000000");
        assert_eq!(entry.found_ingredients, vec!["eggs", "milk"]);
        assert_eq!(entry.recipes[0].cook_time, "10 minutes");
    }

    #[test]
    fn test_missing_recipe_fields_default_to_empty() {
        let recipe: Recipe = serde_json::from_str(r#"{"title": "Toast"}"#).unwrap();
        assert_eq!(recipe.title, "Toast");
        assert_eq!(recipe.cook_time, "");
        assert!(recipe.ingredients.is_empty());
        assert!(recipe.instructions.is_empty());
    }

    #[test]
    fn test_entry_result_strips_identity() {
        let result = ScanResult {
            found_ingredients: vec!["butter".into()],
            recipes: vec![],
        };
        let entry = HistoryEntry::new("abc".into(), 42, result.clone());
        assert_eq!(entry.result(), result);
    }
}
