use super::{is_constraint_violation, open_connection, with_tx, RecipeStore};
use crate::error::{Result, SpiceboxError};
use crate::model::{Ingredient, NewRecipe, Recipe, RecipeIngredient, RecipeSummary};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::Path;
use std::sync::Mutex;

const SCHEMA: &str = r#"
    PRAGMA foreign_keys = ON;
    CREATE TABLE IF NOT EXISTS recipes (
        id     INTEGER PRIMARY KEY,
        name   TEXT NOT NULL UNIQUE,
        steps  TEXT NOT NULL DEFAULT ''
    );
    CREATE TABLE IF NOT EXISTS ingredients (
        id    INTEGER PRIMARY KEY,
        name  TEXT NOT NULL UNIQUE,
        unit  TEXT NOT NULL DEFAULT ''
    );
    CREATE TABLE IF NOT EXISTS recipe_ingredients (
        recipe_id      INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
        ingredient_id  INTEGER NOT NULL REFERENCES ingredients(id) ON DELETE CASCADE,
        quantity       REAL NOT NULL DEFAULT 0,
        position       INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (recipe_id, ingredient_id)
    );
"#;

/// SQLite-backed recipe store
pub struct SqliteRecipeStore {
    conn: Mutex<Connection>,
}

impl SqliteRecipeStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_connection(open_connection(path.as_ref())?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn recipe_id(tx: &Transaction<'_>, name: &str) -> Result<Option<i64>> {
    Ok(tx
        .query_row("SELECT id FROM recipes WHERE name = ?1", params![name], |row| {
            row.get(0)
        })
        .optional()?)
}

fn require_recipe(tx: &Transaction<'_>, name: &str) -> Result<i64> {
    recipe_id(tx, name)?.ok_or_else(|| SpiceboxError::not_found(format!("'{}' not found.", name)))
}

fn ingredient_id(tx: &Transaction<'_>, name: &str) -> Result<Option<i64>> {
    Ok(tx
        .query_row(
            "SELECT id FROM ingredients WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?)
}

/// Existing ingredients keep their unit; new ones take the given unit.
fn ensure_ingredient(tx: &Transaction<'_>, name: &str, unit: &str) -> Result<i64> {
    if let Some(id) = ingredient_id(tx, name)? {
        return Ok(id);
    }
    tx.execute(
        "INSERT INTO ingredients (name, unit) VALUES (?1, ?2)",
        params![name, unit],
    )?;
    debug!("created ingredient '{}' ({})", name, unit);
    Ok(tx.last_insert_rowid())
}

/// Ingredient id used by `recipe_id` under `ingredient`, if any
fn usage_ingredient_id(tx: &Transaction<'_>, recipe_id: i64, ingredient: &str) -> Result<Option<i64>> {
    Ok(tx
        .query_row(
            "SELECT i.id FROM recipe_ingredients ri
             JOIN ingredients i ON i.id = ri.ingredient_id
             WHERE ri.recipe_id = ?1 AND i.name = ?2",
            params![recipe_id, ingredient],
            |row| row.get(0),
        )
        .optional()?)
}

fn missing_usage(recipe: &str, ingredient: &str) -> SpiceboxError {
    SpiceboxError::not_found(format!(
        "Ingredient '{}' not found in '{}'.",
        ingredient, recipe
    ))
}

fn load_usages(tx: &Transaction<'_>, recipe_id: i64) -> Result<Vec<RecipeIngredient>> {
    let mut stmt = tx.prepare(
        "SELECT i.name, ri.quantity, i.unit FROM recipe_ingredients ri
         JOIN ingredients i ON i.id = ri.ingredient_id
         WHERE ri.recipe_id = ?1
         ORDER BY ri.position, i.name",
    )?;
    let rows = stmt.query_map(params![recipe_id], |row| {
        Ok(RecipeIngredient {
            name: row.get(0)?,
            quantity: row.get(1)?,
            unit: row.get(2)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

impl RecipeStore for SqliteRecipeStore {
    fn insert_recipe(&self, recipe: &NewRecipe) -> Result<()> {
        with_tx(&self.conn, |tx| {
            if recipe_id(tx, &recipe.name)?.is_some() {
                return Err(SpiceboxError::already_exists(format!(
                    "Recipe name '{}' already exists.",
                    recipe.name
                )));
            }

            tx.execute(
                "INSERT INTO recipes (name, steps) VALUES (?1, ?2)",
                params![recipe.name, recipe.steps],
            )
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    SpiceboxError::already_exists(format!(
                        "Recipe name '{}' already exists.",
                        recipe.name
                    ))
                } else {
                    e.into()
                }
            })?;
            let id = tx.last_insert_rowid();

            // Repeated ingredients in one recipe are folded into a single usage
            for (position, usage) in recipe.ingredients.iter().enumerate() {
                let ingredient = ensure_ingredient(tx, &usage.name, &usage.unit)?;
                tx.execute(
                    "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, quantity, position)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(recipe_id, ingredient_id)
                     DO UPDATE SET quantity = quantity + excluded.quantity",
                    params![id, ingredient, usage.quantity, position as i64],
                )?;
            }
            Ok(())
        })
    }

    fn list_recipes(&self) -> Result<Vec<RecipeSummary>> {
        with_tx(&self.conn, |tx| {
            let mut stmt = tx.prepare("SELECT name, steps FROM recipes ORDER BY id")?;
            let rows = stmt.query_map([], |row| {
                Ok(RecipeSummary {
                    name: row.get(0)?,
                    steps: row.get(1)?,
                })
            })?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    fn find_recipe(&self, name: &str) -> Result<Option<Recipe>> {
        with_tx(&self.conn, |tx| {
            let found: Option<(i64, String, String)> = tx
                .query_row(
                    "SELECT id, name, steps FROM recipes WHERE name = ?1",
                    params![name],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                )
                .optional()?;

            match found {
                Some((id, name, steps)) => Ok(Some(Recipe {
                    name,
                    steps,
                    ingredients: load_usages(tx, id)?,
                    spices: Vec::new(),
                })),
                None => Ok(None),
            }
        })
    }

    fn delete_recipe(&self, name: &str) -> Result<()> {
        with_tx(&self.conn, |tx| {
            let id = require_recipe(tx, name)?;
            tx.execute("DELETE FROM recipes WHERE id = ?1", params![id])?;
            Ok(())
        })
    }

    fn rename_recipe(&self, old_name: &str, new_name: &str) -> Result<()> {
        with_tx(&self.conn, |tx| {
            let id = require_recipe(tx, old_name)?;
            if old_name != new_name && recipe_id(tx, new_name)?.is_some() {
                return Err(SpiceboxError::already_exists(format!(
                    "Recipe name '{}' already exists.",
                    new_name
                )));
            }
            tx.execute(
                "UPDATE recipes SET name = ?1 WHERE id = ?2",
                params![new_name, id],
            )?;
            Ok(())
        })
    }

    fn remove_recipe_ingredient(&self, recipe: &str, ingredient: &str) -> Result<()> {
        with_tx(&self.conn, |tx| {
            let id = require_recipe(tx, recipe)?;
            let used = usage_ingredient_id(tx, id, ingredient)?
                .ok_or_else(|| missing_usage(recipe, ingredient))?;
            tx.execute(
                "DELETE FROM recipe_ingredients WHERE recipe_id = ?1 AND ingredient_id = ?2",
                params![id, used],
            )?;
            Ok(())
        })
    }

    fn replace_recipe_ingredient(
        &self,
        recipe: &str,
        old_ingredient: &str,
        new_ingredient: &str,
        unit: Option<&str>,
    ) -> Result<()> {
        with_tx(&self.conn, |tx| {
            let id = require_recipe(tx, recipe)?;
            let old_id = usage_ingredient_id(tx, id, old_ingredient)?
                .ok_or_else(|| missing_usage(recipe, old_ingredient))?;
            if old_ingredient == new_ingredient {
                return Ok(());
            }
            if usage_ingredient_id(tx, id, new_ingredient)?.is_some() {
                return Err(SpiceboxError::already_exists(format!(
                    "Ingredient '{}' already used in '{}'.",
                    new_ingredient, recipe
                )));
            }
            let new_id = ensure_ingredient(tx, new_ingredient, unit.unwrap_or(""))?;
            tx.execute(
                "UPDATE recipe_ingredients SET ingredient_id = ?1
                 WHERE recipe_id = ?2 AND ingredient_id = ?3",
                params![new_id, id, old_id],
            )?;
            Ok(())
        })
    }

    fn set_recipe_quantity(&self, recipe: &str, ingredient: &str, quantity: f64) -> Result<()> {
        with_tx(&self.conn, |tx| {
            let id = require_recipe(tx, recipe)?;
            let used = usage_ingredient_id(tx, id, ingredient)?
                .ok_or_else(|| missing_usage(recipe, ingredient))?;
            tx.execute(
                "UPDATE recipe_ingredients SET quantity = ?1
                 WHERE recipe_id = ?2 AND ingredient_id = ?3",
                params![quantity, id, used],
            )?;
            Ok(())
        })
    }

    fn insert_ingredient(&self, ingredient: &Ingredient) -> Result<()> {
        with_tx(&self.conn, |tx| {
            if ingredient_id(tx, &ingredient.name)?.is_some() {
                return Err(SpiceboxError::already_exists(format!(
                    "Ingredient '{}' already in database.",
                    ingredient.name
                )));
            }
            tx.execute(
                "INSERT INTO ingredients (name, unit) VALUES (?1, ?2)",
                params![ingredient.name, ingredient.unit],
            )?;
            Ok(())
        })
    }

    fn list_ingredients(&self) -> Result<Vec<Ingredient>> {
        with_tx(&self.conn, |tx| {
            let mut stmt = tx.prepare("SELECT name, unit FROM ingredients ORDER BY id")?;
            let rows = stmt.query_map([], |row| {
                Ok(Ingredient {
                    name: row.get(0)?,
                    unit: row.get(1)?,
                })
            })?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    fn find_ingredient(&self, name: &str) -> Result<Option<Ingredient>> {
        with_tx(&self.conn, |tx| {
            Ok(tx
                .query_row(
                    "SELECT name, unit FROM ingredients WHERE name = ?1",
                    params![name],
                    |row| {
                        Ok(Ingredient {
                            name: row.get(0)?,
                            unit: row.get(1)?,
                        })
                    },
                )
                .optional()?)
        })
    }

    fn rename_ingredient(&self, old_name: &str, new_name: &str) -> Result<()> {
        with_tx(&self.conn, |tx| {
            let id = ingredient_id(tx, old_name)?
                .ok_or_else(|| SpiceboxError::not_found(format!("'{}' not found.", old_name)))?;
            if old_name != new_name && ingredient_id(tx, new_name)?.is_some() {
                return Err(SpiceboxError::already_exists(format!(
                    "Ingredient '{}' already in database.",
                    new_name
                )));
            }
            tx.execute(
                "UPDATE ingredients SET name = ?1 WHERE id = ?2",
                params![new_name, id],
            )?;
            Ok(())
        })
    }

    fn set_ingredient_unit(&self, name: &str, unit: &str) -> Result<()> {
        with_tx(&self.conn, |tx| {
            let changed = tx.execute(
                "UPDATE ingredients SET unit = ?1 WHERE name = ?2",
                params![unit, name],
            )?;
            if changed == 0 {
                return Err(SpiceboxError::not_found(format!("'{}' not found.", name)));
            }
            Ok(())
        })
    }

    fn delete_ingredient(&self, name: &str) -> Result<()> {
        with_tx(&self.conn, |tx| {
            let removed = tx.execute("DELETE FROM ingredients WHERE name = ?1", params![name])?;
            if removed == 0 {
                return Err(SpiceboxError::not_found(format!("'{}' not found.", name)));
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pancakes() -> NewRecipe {
        NewRecipe {
            name: "Pancakes".to_string(),
            steps: "Mix And Fry".to_string(),
            ingredients: vec![
                RecipeIngredient {
                    name: "Flour".to_string(),
                    quantity: 200.0,
                    unit: "Grm".to_string(),
                },
                RecipeIngredient {
                    name: "Milk".to_string(),
                    quantity: 250.0,
                    unit: "Mls".to_string(),
                },
            ],
            spices: Vec::new(),
        }
    }

    #[test]
    fn test_insert_and_find_recipe() {
        let store = SqliteRecipeStore::open_in_memory().unwrap();
        store.insert_recipe(&pancakes()).unwrap();

        let recipe = store.find_recipe("Pancakes").unwrap().unwrap();
        assert_eq!(recipe.steps, "Mix And Fry");
        assert_eq!(recipe.ingredients.len(), 2);
        assert_eq!(recipe.ingredients[0].name, "Flour");
        assert_eq!(recipe.ingredients[1].unit, "Mls");
        assert_eq!(store.list_ingredients().unwrap().len(), 2);
    }

    #[test]
    fn test_duplicate_recipe_leaves_original_intact() {
        let store = SqliteRecipeStore::open_in_memory().unwrap();
        store.insert_recipe(&pancakes()).unwrap();

        let mut second = pancakes();
        second.steps = "Something Else".to_string();
        second.ingredients[0].name = "Rye".to_string();
        let err = store.insert_recipe(&second).unwrap_err();
        assert!(matches!(err, SpiceboxError::AlreadyExists(_)));

        let recipe = store.find_recipe("Pancakes").unwrap().unwrap();
        assert_eq!(recipe.steps, "Mix And Fry");
        // the rolled-back transaction must not leave the new ingredient behind
        assert!(store.find_ingredient("Rye").unwrap().is_none());
    }

    #[test]
    fn test_repeated_ingredient_is_folded() {
        let store = SqliteRecipeStore::open_in_memory().unwrap();
        let mut recipe = pancakes();
        recipe.ingredients.push(RecipeIngredient {
            name: "Flour".to_string(),
            quantity: 50.0,
            unit: "Grm".to_string(),
        });
        store.insert_recipe(&recipe).unwrap();

        let stored = store.find_recipe("Pancakes").unwrap().unwrap();
        assert_eq!(stored.ingredients.len(), 2);
        assert_eq!(stored.ingredients[0].quantity, 250.0);
    }

    #[test]
    fn test_existing_ingredient_keeps_its_unit() {
        let store = SqliteRecipeStore::open_in_memory().unwrap();
        store
            .insert_ingredient(&Ingredient {
                name: "Flour".to_string(),
                unit: "Kg".to_string(),
            })
            .unwrap();
        store.insert_recipe(&pancakes()).unwrap();

        let recipe = store.find_recipe("Pancakes").unwrap().unwrap();
        assert_eq!(recipe.ingredients[0].unit, "Kg");
    }

    #[test]
    fn test_delete_recipe_cascades_usages_only() {
        let store = SqliteRecipeStore::open_in_memory().unwrap();
        store.insert_recipe(&pancakes()).unwrap();
        store.delete_recipe("Pancakes").unwrap();

        assert!(store.find_recipe("Pancakes").unwrap().is_none());
        assert_eq!(store.list_ingredients().unwrap().len(), 2);
        assert!(matches!(
            store.delete_recipe("Pancakes"),
            Err(SpiceboxError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_ingredient_removes_usages() {
        let store = SqliteRecipeStore::open_in_memory().unwrap();
        store.insert_recipe(&pancakes()).unwrap();
        store.delete_ingredient("Milk").unwrap();

        let recipe = store.find_recipe("Pancakes").unwrap().unwrap();
        assert_eq!(recipe.ingredients.len(), 1);
    }

    #[test]
    fn test_rename_recipe_conflict() {
        let store = SqliteRecipeStore::open_in_memory().unwrap();
        store.insert_recipe(&pancakes()).unwrap();
        let mut waffles = pancakes();
        waffles.name = "Waffles".to_string();
        store.insert_recipe(&waffles).unwrap();

        assert!(matches!(
            store.rename_recipe("Waffles", "Pancakes"),
            Err(SpiceboxError::AlreadyExists(_))
        ));
        store.rename_recipe("Waffles", "Belgian Waffles").unwrap();
        assert!(store.find_recipe("Belgian Waffles").unwrap().is_some());
    }

    #[test]
    fn test_replace_and_requantify_usage() {
        let store = SqliteRecipeStore::open_in_memory().unwrap();
        store.insert_recipe(&pancakes()).unwrap();

        store
            .replace_recipe_ingredient("Pancakes", "Milk", "Oat Milk", Some("Mls"))
            .unwrap();
        store.set_recipe_quantity("Pancakes", "Oat Milk", 300.0).unwrap();

        let recipe = store.find_recipe("Pancakes").unwrap().unwrap();
        let oat = recipe
            .ingredients
            .iter()
            .find(|i| i.name == "Oat Milk")
            .unwrap();
        assert_eq!(oat.quantity, 300.0);
        assert_eq!(oat.unit, "Mls");

        assert!(matches!(
            store.replace_recipe_ingredient("Pancakes", "Oat Milk", "Flour", None),
            Err(SpiceboxError::AlreadyExists(_))
        ));
        assert!(matches!(
            store.set_recipe_quantity("Pancakes", "Eggs", 2.0),
            Err(SpiceboxError::NotFound(_))
        ));
    }

    #[test]
    fn test_ingredient_crud() {
        let store = SqliteRecipeStore::open_in_memory().unwrap();
        let eggs = Ingredient {
            name: "Eggs".to_string(),
            unit: "Unit".to_string(),
        };
        store.insert_ingredient(&eggs).unwrap();
        assert!(matches!(
            store.insert_ingredient(&eggs),
            Err(SpiceboxError::AlreadyExists(_))
        ));

        store.set_ingredient_unit("Eggs", "Dozen").unwrap();
        store.rename_ingredient("Eggs", "Quail Eggs").unwrap();
        let found = store.find_ingredient("Quail Eggs").unwrap().unwrap();
        assert_eq!(found.unit, "Dozen");

        store.delete_ingredient("Quail Eggs").unwrap();
        assert!(store.list_ingredients().unwrap().is_empty());
        assert!(matches!(
            store.set_ingredient_unit("Eggs", "Grm"),
            Err(SpiceboxError::NotFound(_))
        ));
    }
}
