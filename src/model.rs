use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A stored recipe with its ingredient usages and linked spices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    pub steps: String,
    pub ingredients: Vec<RecipeIngredient>,
    #[serde(default)]
    pub spices: Vec<String>,
}

impl Recipe {
    pub fn ingredient_names(&self) -> impl Iterator<Item = &str> {
        self.ingredients.iter().map(|i| i.name.as_str())
    }
}

/// Listing view of a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub name: String,
    pub steps: String,
}

/// One ingredient as used by a recipe: the quantity lives on the usage,
/// the unit is the ingredient's canonical unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
}

/// An ingredient in the recipe store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(default)]
    pub unit: String,
}

/// A validated recipe ready to be persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewRecipe {
    pub name: String,
    pub steps: String,
    pub ingredients: Vec<RecipeIngredient>,
    /// Spices to link once the recipe exists
    #[serde(default)]
    pub spices: Vec<String>,
}

/// A spice and its pairing lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spice {
    pub name: String,
    #[serde(default)]
    pub flavor_profile: String,
    #[serde(default)]
    pub recommended_quantity: String,
    #[serde(default)]
    pub pairs_with_ingredients: BTreeSet<String>,
    #[serde(default)]
    pub pairs_with_recipes: BTreeSet<String>,
}

/// Listing view of a spice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpiceSummary {
    pub name: String,
    pub flavor_profile: String,
}

impl From<&Spice> for SpiceSummary {
    fn from(spice: &Spice) -> Self {
        SpiceSummary {
            name: spice.name.clone(),
            flavor_profile: spice.flavor_profile.clone(),
        }
    }
}

/// Partial update of a spice. Pairing lists are merged, not replaced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpiceUpdate {
    pub name: String,
    pub flavor_profile: Option<String>,
    pub recommended_quantity: Option<String>,
    pub pairs_with_ingredients: Option<Vec<String>>,
    pub pairs_with_recipes: Option<Vec<String>>,
}

/// A spice linked to a recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeSpice {
    pub recipe_name: String,
    pub spice_name: String,
}

/// A ranked spice suggestion for a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpiceSuggestion {
    pub name: String,
    pub match_score: usize,
    pub flavor_profile: String,
    pub recommended_quantity: String,
}

/// Rename of a recipe or an ingredient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenameRequest {
    pub old_name: String,
    pub new_name: String,
}

/// Swap one ingredient of a recipe for another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientSwap {
    pub recipe_name: String,
    pub old_ingredient: String,
    pub new_ingredient: String,
    /// Unit for the new ingredient if it has to be created
    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityChange {
    pub recipe_name: String,
    pub ingredient: String,
    pub new_quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitChange {
    pub name: String,
    pub new_unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRequest {
    pub spice_name: String,
    pub recipe_name: String,
}

/// Join a pairing list into its stored comma-delimited form.
pub fn join_pairings(names: &BTreeSet<String>) -> String {
    names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

/// Split a stored comma-delimited pairing list, dropping empty entries.
pub fn split_pairings(stored: &str) -> BTreeSet<String> {
    stored
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect()
}
