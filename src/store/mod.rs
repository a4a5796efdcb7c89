//! Persistence for the two independent stores.
//!
//! The recipe store owns recipes, ingredients and ingredient usages. The spice store owns
//! spices, their delimited pairing lists and the recipe links, which reference recipes
//! by name only. Nothing here checks one store against the other; that is the bridge's job.

mod recipes;
mod spices;

pub use recipes::SqliteRecipeStore;
pub use spices::SqliteSpiceStore;

use crate::config::StorageConfig;
use crate::error::{Result, SpiceboxError};
use crate::model::{Ingredient, NewRecipe, Recipe, RecipeSummary, Spice, SpiceUpdate};
use log::info;
use rusqlite::{Connection, Transaction};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Recipes, ingredients and the quantities joining them
pub trait RecipeStore: Send + Sync {
    /// Insert a recipe, creating any ingredient it names that does not exist yet
    fn insert_recipe(&self, recipe: &NewRecipe) -> Result<()>;
    fn list_recipes(&self) -> Result<Vec<RecipeSummary>>;
    /// Fetch a recipe with its ingredient usages (spice links are not known here)
    fn find_recipe(&self, name: &str) -> Result<Option<Recipe>>;
    fn delete_recipe(&self, name: &str) -> Result<()>;
    fn rename_recipe(&self, old_name: &str, new_name: &str) -> Result<()>;
    fn remove_recipe_ingredient(&self, recipe: &str, ingredient: &str) -> Result<()>;
    /// Point a usage at another ingredient, creating it with `unit` if missing
    fn replace_recipe_ingredient(
        &self,
        recipe: &str,
        old_ingredient: &str,
        new_ingredient: &str,
        unit: Option<&str>,
    ) -> Result<()>;
    fn set_recipe_quantity(&self, recipe: &str, ingredient: &str, quantity: f64) -> Result<()>;

    fn insert_ingredient(&self, ingredient: &Ingredient) -> Result<()>;
    fn list_ingredients(&self) -> Result<Vec<Ingredient>>;
    fn find_ingredient(&self, name: &str) -> Result<Option<Ingredient>>;
    fn rename_ingredient(&self, old_name: &str, new_name: &str) -> Result<()>;
    fn set_ingredient_unit(&self, name: &str, unit: &str) -> Result<()>;
    /// Delete an ingredient along with every usage of it
    fn delete_ingredient(&self, name: &str) -> Result<()>;
}

/// Spices, pairing lists and recipe links
pub trait SpiceStore: Send + Sync {
    fn insert_spice(&self, spice: &Spice) -> Result<()>;
    fn list_spices(&self) -> Result<Vec<Spice>>;
    fn find_spice(&self, name: &str) -> Result<Option<Spice>>;
    /// Apply a partial update, merging pairing lists
    fn update_spice(&self, update: &SpiceUpdate) -> Result<Spice>;

    /// Record a link and add the recipe to the spice's recipe pairings in one transaction.
    /// A second link for the same pair is rejected.
    fn insert_link(&self, spice: &str, recipe: &str) -> Result<()>;
    fn delete_link(&self, spice: &str, recipe: &str) -> Result<()>;
    fn linked_spices(&self, recipe: &str) -> Result<Vec<Spice>>;
    /// Union ingredient names into a spice's ingredient pairings
    fn learn_ingredients(&self, spice: &str, ingredients: &[String]) -> Result<()>;

    /// Drop every link and recipe pairing that references `recipe`; returns how many links
    /// were removed
    fn forget_recipe(&self, recipe: &str) -> Result<usize>;
    fn rename_recipe_references(&self, old_name: &str, new_name: &str) -> Result<()>;
    fn rename_ingredient_references(&self, old_name: &str, new_name: &str) -> Result<()>;
}

/// Open both stores as configured.
pub fn open_stores(config: &StorageConfig) -> Result<(Arc<dyn RecipeStore>, Arc<dyn SpiceStore>)> {
    if config.in_memory {
        info!("Using in-memory recipe and spice stores");
        return Ok((
            Arc::new(SqliteRecipeStore::open_in_memory()?),
            Arc::new(SqliteSpiceStore::open_in_memory()?),
        ));
    }

    info!(
        "Opening recipe store at {} and spice store at {}",
        config.recipes_db, config.spices_db
    );
    Ok((
        Arc::new(SqliteRecipeStore::open(&config.recipes_db)?),
        Arc::new(SqliteSpiceStore::open(&config.spices_db)?),
    ))
}

pub(crate) fn open_connection(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(Connection::open(path)?)
}

/// Run `f` inside a transaction on the locked connection. The transaction is committed
/// only when `f` succeeds; an error rolls it back.
pub(crate) fn with_tx<T>(
    conn: &Mutex<Connection>,
    f: impl FnOnce(&Transaction<'_>) -> Result<T>,
) -> Result<T> {
    let mut guard = conn
        .lock()
        .map_err(|e| SpiceboxError::StoreUnavailable(e.to_string()))?;
    let tx = guard.transaction()?;
    let value = f(&tx)?;
    tx.commit()?;
    Ok(value)
}

pub(crate) fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
