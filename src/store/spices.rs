use super::{is_constraint_violation, open_connection, with_tx, SpiceStore};
use crate::error::{Result, SpiceboxError};
use crate::model::{join_pairings, split_pairings, Spice, SpiceUpdate};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Mutex;

const SCHEMA: &str = r#"
    PRAGMA foreign_keys = ON;
    CREATE TABLE IF NOT EXISTS spices (
        id                      INTEGER PRIMARY KEY,
        name                    TEXT NOT NULL UNIQUE,
        flavor_profile          TEXT NOT NULL DEFAULT '',
        recommended_quantity    TEXT NOT NULL DEFAULT '',
        pairs_with_ingredients  TEXT NOT NULL DEFAULT '',
        pairs_with_recipes      TEXT NOT NULL DEFAULT ''
    );
    CREATE TABLE IF NOT EXISTS recipe_spices (
        spice_id     INTEGER NOT NULL REFERENCES spices(id) ON DELETE CASCADE,
        recipe_name  TEXT NOT NULL,
        PRIMARY KEY (spice_id, recipe_name)
    );
"#;

const SPICE_COLUMNS: &str =
    "id, name, flavor_profile, recommended_quantity, pairs_with_ingredients, pairs_with_recipes";

/// SQLite-backed spice store
pub struct SqliteSpiceStore {
    conn: Mutex<Connection>,
}

impl SqliteSpiceStore {
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

fn spice_from_row(row: &Row<'_>) -> rusqlite::Result<(i64, Spice)> {
    let ingredients: String = row.get(4)?;
    let recipes: String = row.get(5)?;
    Ok((
        row.get(0)?,
        Spice {
            name: row.get(1)?,
            flavor_profile: row.get(2)?,
            recommended_quantity: row.get(3)?,
            pairs_with_ingredients: split_pairings(&ingredients),
            pairs_with_recipes: split_pairings(&recipes),
        },
    ))
}

fn find(tx: &Transaction<'_>, name: &str) -> Result<Option<(i64, Spice)>> {
    Ok(tx
        .query_row(
            &format!("SELECT {} FROM spices WHERE name = ?1", SPICE_COLUMNS),
            params![name],
            spice_from_row,
        )
        .optional()?)
}

fn require(tx: &Transaction<'_>, name: &str) -> Result<(i64, Spice)> {
    find(tx, name)?.ok_or_else(|| SpiceboxError::not_found(format!("'{}' not found.", name)))
}

fn all_spices(tx: &Transaction<'_>) -> Result<Vec<(i64, Spice)>> {
    let mut stmt = tx.prepare(&format!("SELECT {} FROM spices ORDER BY id", SPICE_COLUMNS))?;
    let rows = stmt.query_map([], spice_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn write_pairings(tx: &Transaction<'_>, id: i64, spice: &Spice) -> Result<()> {
    tx.execute(
        "UPDATE spices SET pairs_with_ingredients = ?1, pairs_with_recipes = ?2 WHERE id = ?3",
        params![
            join_pairings(&spice.pairs_with_ingredients),
            join_pairings(&spice.pairs_with_recipes),
            id
        ],
    )?;
    Ok(())
}

/// Swap `old` for `new` in a pairing set; returns whether anything changed.
fn rename_in(set: &mut BTreeSet<String>, old: &str, new: &str) -> bool {
    if set.remove(old) {
        set.insert(new.to_string());
        true
    } else {
        false
    }
}

impl SpiceStore for SqliteSpiceStore {
    fn insert_spice(&self, spice: &Spice) -> Result<()> {
        with_tx(&self.conn, |tx| {
            tx.execute(
                "INSERT INTO spices (name, flavor_profile, recommended_quantity,
                                     pairs_with_ingredients, pairs_with_recipes)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    spice.name,
                    spice.flavor_profile,
                    spice.recommended_quantity,
                    join_pairings(&spice.pairs_with_ingredients),
                    join_pairings(&spice.pairs_with_recipes)
                ],
            )
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    SpiceboxError::already_exists(format!(
                        "Spice '{}' already exists.",
                        spice.name
                    ))
                } else {
                    e.into()
                }
            })?;
            Ok(())
        })
    }

    fn list_spices(&self) -> Result<Vec<Spice>> {
        with_tx(&self.conn, |tx| {
            Ok(all_spices(tx)?.into_iter().map(|(_, s)| s).collect())
        })
    }

    fn find_spice(&self, name: &str) -> Result<Option<Spice>> {
        with_tx(&self.conn, |tx| Ok(find(tx, name)?.map(|(_, s)| s)))
    }

    fn update_spice(&self, update: &SpiceUpdate) -> Result<Spice> {
        with_tx(&self.conn, |tx| {
            let (id, mut spice) = require(tx, &update.name)?;

            if let Some(flavor) = &update.flavor_profile {
                spice.flavor_profile = flavor.clone();
            }
            if let Some(quantity) = &update.recommended_quantity {
                spice.recommended_quantity = quantity.clone();
            }
            if let Some(ingredients) = &update.pairs_with_ingredients {
                spice.pairs_with_ingredients.extend(ingredients.iter().cloned());
            }
            if let Some(recipes) = &update.pairs_with_recipes {
                spice.pairs_with_recipes.extend(recipes.iter().cloned());
            }

            tx.execute(
                "UPDATE spices SET flavor_profile = ?1, recommended_quantity = ?2 WHERE id = ?3",
                params![spice.flavor_profile, spice.recommended_quantity, id],
            )?;
            write_pairings(tx, id, &spice)?;
            Ok(spice)
        })
    }

    fn insert_link(&self, spice: &str, recipe: &str) -> Result<()> {
        with_tx(&self.conn, |tx| {
            let (id, mut stored) = require(tx, spice)?;
            tx.execute(
                "INSERT INTO recipe_spices (spice_id, recipe_name) VALUES (?1, ?2)",
                params![id, recipe],
            )
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    SpiceboxError::already_exists(format!(
                        "'{}' already linked to '{}'.",
                        spice, recipe
                    ))
                } else {
                    e.into()
                }
            })?;

            if stored.pairs_with_recipes.insert(recipe.to_string()) {
                write_pairings(tx, id, &stored)?;
            }
            Ok(())
        })
    }

    fn delete_link(&self, spice: &str, recipe: &str) -> Result<()> {
        with_tx(&self.conn, |tx| {
            let removed = tx.execute(
                "DELETE FROM recipe_spices
                 WHERE recipe_name = ?2
                   AND spice_id = (SELECT id FROM spices WHERE name = ?1)",
                params![spice, recipe],
            )?;
            if removed == 0 {
                return Err(SpiceboxError::not_found(format!(
                    "'{}' not linked to '{}'.",
                    spice, recipe
                )));
            }
            Ok(())
        })
    }

    fn linked_spices(&self, recipe: &str) -> Result<Vec<Spice>> {
        with_tx(&self.conn, |tx| {
            let mut stmt = tx.prepare(
                "SELECT s.id, s.name, s.flavor_profile, s.recommended_quantity,
                        s.pairs_with_ingredients, s.pairs_with_recipes
                 FROM recipe_spices rs
                 JOIN spices s ON s.id = rs.spice_id
                 WHERE rs.recipe_name = ?1
                 ORDER BY s.name",
            )?;
            let rows = stmt.query_map(params![recipe], spice_from_row)?;
            let linked = rows.collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(linked.into_iter().map(|(_, s)| s).collect())
        })
    }

    fn learn_ingredients(&self, spice: &str, ingredients: &[String]) -> Result<()> {
        with_tx(&self.conn, |tx| {
            let (id, mut stored) = require(tx, spice)?;
            let before = stored.pairs_with_ingredients.len();
            stored
                .pairs_with_ingredients
                .extend(ingredients.iter().cloned());
            if stored.pairs_with_ingredients.len() != before {
                debug!(
                    "'{}' learned {} new ingredient pairings",
                    spice,
                    stored.pairs_with_ingredients.len() - before
                );
                write_pairings(tx, id, &stored)?;
            }
            Ok(())
        })
    }

    fn forget_recipe(&self, recipe: &str) -> Result<usize> {
        with_tx(&self.conn, |tx| {
            let removed = tx.execute(
                "DELETE FROM recipe_spices WHERE recipe_name = ?1",
                params![recipe],
            )?;
            for (id, mut spice) in all_spices(tx)? {
                if spice.pairs_with_recipes.remove(recipe) {
                    write_pairings(tx, id, &spice)?;
                }
            }
            Ok(removed)
        })
    }

    fn rename_recipe_references(&self, old_name: &str, new_name: &str) -> Result<()> {
        with_tx(&self.conn, |tx| {
            // a spice already linked to both names keeps a single link
            tx.execute(
                "UPDATE OR IGNORE recipe_spices SET recipe_name = ?2 WHERE recipe_name = ?1",
                params![old_name, new_name],
            )?;
            tx.execute(
                "DELETE FROM recipe_spices WHERE recipe_name = ?1",
                params![old_name],
            )?;

            for (id, mut spice) in all_spices(tx)? {
                if rename_in(&mut spice.pairs_with_recipes, old_name, new_name) {
                    write_pairings(tx, id, &spice)?;
                }
            }
            Ok(())
        })
    }

    fn rename_ingredient_references(&self, old_name: &str, new_name: &str) -> Result<()> {
        with_tx(&self.conn, |tx| {
            for (id, mut spice) in all_spices(tx)? {
                if rename_in(&mut spice.pairs_with_ingredients, old_name, new_name) {
                    write_pairings(tx, id, &spice)?;
                }
            }
            Ok(())
        })
    }
}
