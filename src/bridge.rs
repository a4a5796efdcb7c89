//! Cross-store consistency between the recipe store and the spice store.
//!
//! The two stores never reference each other directly. Every operation that touches both
//! goes through [`SpiceBridge`], which resolves names in one store before writing to the
//! other.

use crate::error::{Result, SpiceboxError};
use crate::model::{Recipe, RecipeSpice, Spice, SpiceSuggestion};
use crate::normalizer::normalize_name;
use crate::store::{RecipeStore, SpiceStore};
use log::{debug, info};
use std::sync::Arc;

#[derive(Clone)]
pub struct SpiceBridge {
    recipes: Arc<dyn RecipeStore>,
    spices: Arc<dyn SpiceStore>,
}

/// Score a spice against a recipe: one point per recipe ingredient found in the spice's
/// ingredient pairings, plus one if the recipe itself is among its recipe pairings.
pub fn score_spice(spice: &Spice, recipe: &Recipe) -> usize {
    let overlap = recipe
        .ingredient_names()
        .filter(|name| spice.pairs_with_ingredients.contains(*name))
        .count();
    overlap + usize::from(spice.pairs_with_recipes.contains(&recipe.name))
}

impl SpiceBridge {
    pub fn new(recipes: Arc<dyn RecipeStore>, spices: Arc<dyn SpiceStore>) -> Self {
        Self { recipes, spices }
    }

    fn require_recipe(&self, name: &str) -> Result<Recipe> {
        self.recipes
            .find_recipe(name)?
            .ok_or_else(|| SpiceboxError::not_found(format!("Recipe '{}' not found.", name)))
    }

    fn require_spice(&self, name: &str) -> Result<Spice> {
        self.spices
            .find_spice(name)?
            .ok_or_else(|| SpiceboxError::not_found(format!("Spice '{}' not found.", name)))
    }

    /// Link a spice to a recipe. Both must exist and the pair must not be linked yet.
    pub fn link(&self, spice_name: &str, recipe_name: &str) -> Result<RecipeSpice> {
        let spice_name = normalize_name(spice_name);
        let recipe_name = normalize_name(recipe_name);

        self.require_recipe(&recipe_name)?;
        self.require_spice(&spice_name)?;
        self.spices.insert_link(&spice_name, &recipe_name)?;

        info!("Linked '{}' to '{}'", spice_name, recipe_name);
        Ok(RecipeSpice {
            recipe_name,
            spice_name,
        })
    }

    pub fn unlink(&self, spice_name: &str, recipe_name: &str) -> Result<RecipeSpice> {
        let spice_name = normalize_name(spice_name);
        let recipe_name = normalize_name(recipe_name);

        self.require_recipe(&recipe_name)?;
        self.require_spice(&spice_name)?;
        self.spices.delete_link(&spice_name, &recipe_name)?;

        info!("Unlinked '{}' from '{}'", spice_name, recipe_name);
        Ok(RecipeSpice {
            recipe_name,
            spice_name,
        })
    }

    /// Rank every spice that scores above zero for the recipe, best first.
    pub fn suggest(&self, recipe_name: &str) -> Result<Vec<SpiceSuggestion>> {
        let recipe = self.require_recipe(&normalize_name(recipe_name))?;

        let mut suggestions: Vec<SpiceSuggestion> = self
            .spices
            .list_spices()?
            .into_iter()
            .filter_map(|spice| {
                let match_score = score_spice(&spice, &recipe);
                (match_score > 0).then(|| SpiceSuggestion {
                    name: spice.name,
                    match_score,
                    flavor_profile: spice.flavor_profile,
                    recommended_quantity: spice.recommended_quantity,
                })
            })
            .collect();

        suggestions.sort_by(|a, b| {
            b.match_score
                .cmp(&a.match_score)
                .then_with(|| a.name.cmp(&b.name))
        });
        debug!(
            "{} spice suggestions for '{}'",
            suggestions.len(),
            recipe.name
        );
        Ok(suggestions)
    }

    /// Teach every spice linked to the recipe the recipe's ingredient names.
    /// Returns how many spices were updated.
    pub fn learn_from_recipe(&self, recipe_name: &str) -> Result<usize> {
        let recipe = self.require_recipe(&normalize_name(recipe_name))?;
        let ingredients: Vec<String> = recipe.ingredient_names().map(str::to_string).collect();
        if ingredients.is_empty() {
            return Ok(0);
        }

        let linked = self.spices.linked_spices(&recipe.name)?;
        for spice in &linked {
            self.spices.learn_ingredients(&spice.name, &ingredients)?;
        }
        Ok(linked.len())
    }

    /// Names of the spices linked to a recipe
    pub fn spices_for_recipe(&self, recipe_name: &str) -> Result<Vec<String>> {
        Ok(self
            .spices
            .linked_spices(recipe_name)?
            .into_iter()
            .map(|s| s.name)
            .collect())
    }

    pub fn recipe_deleted(&self, recipe_name: &str) -> Result<()> {
        let removed = self.spices.forget_recipe(recipe_name)?;
        if removed > 0 {
            debug!("Dropped {} spice links of '{}'", removed, recipe_name);
        }
        Ok(())
    }

    pub fn recipe_renamed(&self, old_name: &str, new_name: &str) -> Result<()> {
        self.spices.rename_recipe_references(old_name, new_name)
    }

    pub fn ingredient_renamed(&self, old_name: &str, new_name: &str) -> Result<()> {
        self.spices.rename_ingredient_references(old_name, new_name)
    }
}
