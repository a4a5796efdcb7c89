use crate::bridge::SpiceBridge;
use crate::error::{Result, SpiceboxError};
use crate::model::{LinkRequest, RecipeSpice, Spice, SpiceSuggestion, SpiceSummary, SpiceUpdate};
use crate::normalizer::{clean_into, normalize_name, require_name, LINK_CLEANING, SPICE_CLEANING};
use crate::store::SpiceStore;
use log::info;
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct SpiceManager {
    store: Arc<dyn SpiceStore>,
    bridge: SpiceBridge,
}

impl SpiceManager {
    pub fn new(store: Arc<dyn SpiceStore>, bridge: SpiceBridge) -> Self {
        Self { store, bridge }
    }

    pub fn add(&self, raw: &Value) -> Result<Spice> {
        let spice: Spice = clean_into(raw, SPICE_CLEANING)?;
        self.insert(spice)
    }

    /// Store an already cleaned spice.
    pub fn insert(&self, spice: Spice) -> Result<Spice> {
        require_name("name", &spice.name)?;
        self.store.insert_spice(&spice)?;
        info!("Added spice '{}'", spice.name);
        Ok(spice)
    }

    pub fn list(&self) -> Result<Vec<SpiceSummary>> {
        Ok(self
            .store
            .list_spices()?
            .iter()
            .map(SpiceSummary::from)
            .collect())
    }

    pub fn get(&self, name: &str) -> Result<Spice> {
        let name = normalize_name(name);
        self.store
            .find_spice(&name)?
            .ok_or_else(|| SpiceboxError::not_found(format!("'{}' not found.", name)))
    }

    /// Partial update; given pairing lists are merged into the stored ones.
    pub fn update(&self, raw: &Value) -> Result<Spice> {
        let update: SpiceUpdate = clean_into(raw, SPICE_CLEANING)?;
        let spice = self.store.update_spice(&update)?;
        info!("Updated spice '{}'", spice.name);
        Ok(spice)
    }

    pub fn link(&self, raw: &Value) -> Result<RecipeSpice> {
        let request: LinkRequest = clean_into(raw, LINK_CLEANING)?;
        self.bridge.link(&request.spice_name, &request.recipe_name)
    }

    pub fn unlink(&self, raw: &Value) -> Result<RecipeSpice> {
        let request: LinkRequest = clean_into(raw, LINK_CLEANING)?;
        self.bridge.unlink(&request.spice_name, &request.recipe_name)
    }

    pub fn suggest(&self, recipe_name: &str) -> Result<Vec<SpiceSuggestion>> {
        self.bridge.suggest(recipe_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{SqliteRecipeStore, SqliteSpiceStore};
    use serde_json::json;

    fn manager() -> SpiceManager {
        let recipes = Arc::new(SqliteRecipeStore::open_in_memory().unwrap());
        let spices = Arc::new(SqliteSpiceStore::open_in_memory().unwrap());
        let bridge = SpiceBridge::new(recipes, spices.clone());
        SpiceManager::new(spices, bridge)
    }

    #[test]
    fn test_add_keeps_free_text_case() {
        let manager = manager();
        let spice = manager
            .add(&json!({
                "name": " smoked paprika ",
                "flavor_profile": "  Smoky, sweet ",
                "recommended_quantity": " 1/2 tsp",
                "pairs_with_ingredients": "chicken, potato,,"
            }))
            .unwrap();

        assert_eq!(spice.name, "Smoked Paprika");
        assert_eq!(spice.flavor_profile, "Smoky, sweet");
        assert_eq!(spice.recommended_quantity, "1/2 tsp");
        assert_eq!(spice.pairs_with_ingredients.len(), 2);
        assert_eq!(manager.list().unwrap()[0].name, "Smoked Paprika");
    }

    #[test]
    fn test_update_missing_spice() {
        let manager = manager();
        let err = manager
            .update(&json!({"name": "saffron", "flavor_profile": "floral"}))
            .unwrap_err();
        assert!(matches!(err, SpiceboxError::NotFound(_)));
    }

    #[test]
    fn test_link_requires_both_names() {
        let manager = manager();
        let err = manager.link(&json!({"spice_name": "cumin"})).unwrap_err();
        assert!(matches!(err, SpiceboxError::InvalidStructure(_)));
    }

    #[test]
    fn test_suggest_unknown_recipe() {
        let manager = manager();
        let err = manager.suggest("stew").unwrap_err();
        assert_eq!(err.to_string(), "Recipe 'Stew' not found.");
    }
}
