//! Recipe, ingredient and spice management with input normalization.
//!
//! Recipes and ingredients live in one store, spices in another; the
//! [`SpiceBridge`] keeps the two consistent. Client input of any shape goes through the
//! [`normalizer`] before it reaches either store.
//!
//! # Example
//! ```
//! use serde_json::json;
//! use spicebox::Spicebox;
//!
//! let app = Spicebox::in_memory().unwrap();
//! app.recipes.add(&json!({
//!     "name": "apple pie",
//!     "steps": "bake",
//!     "ingredients": [{"name": "apple", "quantity": "3", "unit": "unit"}]
//! })).unwrap();
//! app.spices.add(&json!({"name": "cinnamon", "pairs_with_ingredients": "apple"})).unwrap();
//!
//! let suggestions = app.spices.suggest("Apple Pie").unwrap();
//! assert_eq!(suggestions[0].name, "Cinnamon");
//! ```

pub mod api;
pub mod bridge;
pub mod config;
pub mod error;
pub mod import;
pub mod managers;
pub mod model;
pub mod normalizer;
pub mod store;

pub use bridge::SpiceBridge;
pub use config::{AppConfig, ServerConfig, StorageConfig};
pub use error::{Result, SpiceboxError};
pub use import::{BulkSpiceReport, ImportGateway, ImportOutcome};
pub use managers::{IngredientManager, RecipeManager, SpiceManager};
pub use model::{Ingredient, Recipe, RecipeIngredient, Spice, SpiceSuggestion};
pub use normalizer::normalize_universal_input;

use std::sync::Arc;
use store::{RecipeStore, SpiceStore};

/// Every service wired over one pair of stores
#[derive(Clone)]
pub struct Spicebox {
    pub recipes: RecipeManager,
    pub ingredients: IngredientManager,
    pub spices: SpiceManager,
    pub importer: ImportGateway,
    pub bridge: SpiceBridge,
}

impl Spicebox {
    pub fn new(recipe_store: Arc<dyn RecipeStore>, spice_store: Arc<dyn SpiceStore>) -> Self {
        let bridge = SpiceBridge::new(recipe_store.clone(), spice_store.clone());
        let recipes = RecipeManager::new(recipe_store.clone(), bridge.clone());
        let ingredients = IngredientManager::new(recipe_store, bridge.clone());
        let spices = SpiceManager::new(spice_store, bridge.clone());
        let importer = ImportGateway::new(recipes.clone(), spices.clone(), bridge.clone());

        Self {
            recipes,
            ingredients,
            spices,
            importer,
            bridge,
        }
    }

    /// Open the SQLite stores described by `config`.
    pub fn open(config: &StorageConfig) -> Result<Self> {
        let (recipes, spices) = store::open_stores(config)?;
        Ok(Self::new(recipes, spices))
    }

    /// Fresh in-memory stores, mostly useful for tests and demos.
    pub fn in_memory() -> Result<Self> {
        Self::open(&StorageConfig {
            in_memory: true,
            ..StorageConfig::default()
        })
    }
}
