use crate::bridge::SpiceBridge;
use crate::error::{Result, SpiceboxError};
use crate::model::{IngredientSwap, NewRecipe, QuantityChange, Recipe, RecipeSummary, RenameRequest};
use crate::normalizer::{
    clean_into, normalize_name, require_name, validate_and_clean_recipe,
    INGREDIENT_SWAP_CLEANING, QUANTITY_CHANGE_CLEANING, RENAME_CLEANING,
};
use crate::store::RecipeStore;
use log::{info, warn};
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct RecipeManager {
    store: Arc<dyn RecipeStore>,
    bridge: SpiceBridge,
}

impl RecipeManager {
    pub fn new(store: Arc<dyn RecipeStore>, bridge: SpiceBridge) -> Self {
        Self { store, bridge }
    }

    /// Clean, validate and store a recipe given as raw JSON.
    pub fn add(&self, raw: &Value) -> Result<Recipe> {
        let recipe = validate_and_clean_recipe(raw)?;
        self.create(recipe)
    }

    /// Store an already validated recipe, link the spices it names and let those spices
    /// learn its ingredients.
    ///
    /// Spices that cannot be linked are skipped with a warning; the recipe itself is kept.
    pub fn create(&self, recipe: NewRecipe) -> Result<Recipe> {
        self.store.insert_recipe(&recipe)?;
        info!(
            "Added recipe '{}' with {} ingredients",
            recipe.name,
            recipe.ingredients.len()
        );

        for spice in &recipe.spices {
            if let Err(e) = self.bridge.link(spice, &recipe.name) {
                warn!("Could not link '{}' to '{}': {}", spice, recipe.name, e);
            }
        }
        if !recipe.spices.is_empty() {
            self.bridge.learn_from_recipe(&recipe.name)?;
        }

        self.get(&recipe.name)
    }

    pub fn list(&self) -> Result<Vec<RecipeSummary>> {
        self.store.list_recipes()
    }

    /// Fetch a recipe with its ingredients and linked spices.
    pub fn get(&self, name: &str) -> Result<Recipe> {
        let name = normalize_name(name);
        let mut recipe = self
            .store
            .find_recipe(&name)?
            .ok_or_else(|| SpiceboxError::not_found(format!("'{}' not found.", name)))?;
        recipe.spices = self.bridge.spices_for_recipe(&recipe.name)?;
        Ok(recipe)
    }

    /// Delete a recipe and every spice link pointing at it.
    pub fn remove(&self, name: &str) -> Result<()> {
        let name = normalize_name(name);
        self.store.delete_recipe(&name)?;
        self.bridge.recipe_deleted(&name)?;
        info!("Removed recipe '{}'", name);
        Ok(())
    }

    pub fn remove_ingredient(&self, recipe: &str, ingredient: &str) -> Result<()> {
        let recipe = normalize_name(recipe);
        let ingredient = normalize_name(ingredient);
        self.store.remove_recipe_ingredient(&recipe, &ingredient)?;
        info!("Removed '{}' from '{}'", ingredient, recipe);
        Ok(())
    }

    /// Rename a recipe (`{old_name, new_name}`); spice links follow the new name.
    pub fn rename(&self, raw: &Value) -> Result<RenameRequest> {
        let request: RenameRequest = clean_into(raw, RENAME_CLEANING)?;
        require_name("new_name", &request.new_name)?;

        self.store
            .rename_recipe(&request.old_name, &request.new_name)?;
        self.bridge
            .recipe_renamed(&request.old_name, &request.new_name)?;
        info!(
            "Renamed recipe '{}' to '{}'",
            request.old_name, request.new_name
        );
        Ok(request)
    }

    /// Replace one ingredient of a recipe with another, keeping the quantity.
    pub fn swap_ingredient(&self, raw: &Value) -> Result<IngredientSwap> {
        let swap: IngredientSwap = clean_into(raw, INGREDIENT_SWAP_CLEANING)?;
        require_name("new_ingredient", &swap.new_ingredient)?;

        self.store.replace_recipe_ingredient(
            &swap.recipe_name,
            &swap.old_ingredient,
            &swap.new_ingredient,
            swap.unit.as_deref(),
        )?;
        info!(
            "Replaced '{}' with '{}' in '{}'",
            swap.old_ingredient, swap.new_ingredient, swap.recipe_name
        );
        Ok(swap)
    }

    pub fn set_quantity(&self, raw: &Value) -> Result<QuantityChange> {
        let change: QuantityChange = clean_into(raw, QUANTITY_CHANGE_CLEANING)?;
        self.store
            .set_recipe_quantity(&change.recipe_name, &change.ingredient, change.new_quantity)?;
        info!(
            "Set '{}' in '{}' to {}",
            change.ingredient, change.recipe_name, change.new_quantity
        );
        Ok(change)
    }
}
