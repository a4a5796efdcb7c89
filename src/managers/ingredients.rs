use crate::bridge::SpiceBridge;
use crate::error::{Result, SpiceboxError};
use crate::model::{Ingredient, RenameRequest, UnitChange};
use crate::normalizer::{
    clean_into, normalize_name, require_name, INGREDIENT_CLEANING, RENAME_CLEANING,
    UNIT_CHANGE_CLEANING,
};
use crate::store::RecipeStore;
use log::info;
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct IngredientManager {
    store: Arc<dyn RecipeStore>,
    bridge: SpiceBridge,
}

impl IngredientManager {
    pub fn new(store: Arc<dyn RecipeStore>, bridge: SpiceBridge) -> Self {
        Self { store, bridge }
    }

    pub fn add(&self, raw: &Value) -> Result<Ingredient> {
        let ingredient: Ingredient = clean_into(raw, INGREDIENT_CLEANING)?;
        require_name("name", &ingredient.name)?;
        self.store.insert_ingredient(&ingredient)?;
        info!("Added ingredient '{}'", ingredient.name);
        Ok(ingredient)
    }

    pub fn list(&self) -> Result<Vec<Ingredient>> {
        self.store.list_ingredients()
    }

    pub fn get(&self, name: &str) -> Result<Ingredient> {
        let name = normalize_name(name);
        self.store
            .find_ingredient(&name)?
            .ok_or_else(|| SpiceboxError::not_found(format!("'{}' not found.", name)))
    }

    /// Rename an ingredient everywhere, including spice ingredient pairings.
    pub fn rename(&self, raw: &Value) -> Result<RenameRequest> {
        let request: RenameRequest = clean_into(raw, RENAME_CLEANING)?;
        require_name("new_name", &request.new_name)?;

        self.store
            .rename_ingredient(&request.old_name, &request.new_name)?;
        self.bridge
            .ingredient_renamed(&request.old_name, &request.new_name)?;
        info!(
            "Renamed ingredient '{}' to '{}'",
            request.old_name, request.new_name
        );
        Ok(request)
    }

    pub fn set_unit(&self, raw: &Value) -> Result<UnitChange> {
        let change: UnitChange = clean_into(raw, UNIT_CHANGE_CLEANING)?;
        self.store.set_ingredient_unit(&change.name, &change.new_unit)?;
        info!("Set unit of '{}' to '{}'", change.name, change.new_unit);
        Ok(change)
    }

    /// Delete an ingredient; recipes using it lose that usage.
    pub fn remove(&self, name: &str) -> Result<()> {
        let name = normalize_name(name);
        self.store.delete_ingredient(&name)?;
        info!("Removed ingredient '{}'", name);
        Ok(())
    }
}
