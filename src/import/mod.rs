//! Import of recipes and spices from external payloads.
//!
//! External sources rarely agree on field names, so each record is first mapped onto the
//! canonical schema through an alias table, then normalized, validated and stored through
//! the regular managers. Bulk imports never stop at the first bad record.

use crate::bridge::SpiceBridge;
use crate::error::{Result, SpiceboxError};
use crate::managers::{RecipeManager, SpiceManager};
use crate::model::{Recipe, Spice};
use crate::normalizer::{
    clean_into, normalize_universal_input, parse_quantity, validate_and_clean_recipe,
    SPICE_CLEANING,
};
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::{Map, Value};

/// Canonical field followed by the names it may arrive under, in priority order
type AliasTable = &'static [(&'static str, &'static [&'static str])];

const RECIPE_ALIASES: AliasTable = &[
    ("name", &["name", "title"]),
    ("steps", &["steps", "instructions", "directions"]),
    ("ingredients", &["ingredients", "items"]),
    ("spices", &["spices"]),
];

const INGREDIENT_ALIASES: AliasTable = &[
    ("name", &["name", "ingredient", "item"]),
    ("quantity", &["quantity", "qty", "amount"]),
    ("unit", &["unit", "measure", "units"]),
];

const SPICE_ALIASES: AliasTable = &[
    ("name", &["name", "title"]),
    ("flavor_profile", &["flavor_profile", "flavor", "taste"]),
    ("recommended_quantity", &["recommended_quantity", "dosage"]),
    (
        "pairs_with_ingredients",
        &["pairs_with_ingredients", "combines_ingredients", "pairings_ingredients"],
    ),
    (
        "pairs_with_recipes",
        &["pairs_with_recipes", "recipes", "pairings_recipes"],
    ),
];

/// Result of importing one recipe
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ImportOutcome {
    Success { data: Recipe },
    Error { message: String },
}

impl ImportOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ImportOutcome::Success { .. })
    }
}

/// A spice stored by the importer, with the recipes it could be linked to
#[derive(Debug, Clone, Serialize)]
pub struct SpiceImport {
    pub imported: String,
    pub linked_recipes: Vec<String>,
    pub data: Spice,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedSpice {
    /// Name as found in the payload, when there was one
    pub name: Option<String>,
    pub message: String,
}

/// Summary of a bulk spice import
#[derive(Debug, Clone, Serialize)]
pub struct BulkSpiceReport {
    pub status: &'static str,
    pub success_count: usize,
    pub error_count: usize,
    pub imported_spices: Vec<String>,
    pub failed: Vec<FailedSpice>,
}

/// Rename aliased fields to their canonical names. The first alias holding a non-null
/// value wins; fields not named in the table are dropped.
fn map_aliases(fields: &Map<String, Value>, table: AliasTable) -> Map<String, Value> {
    table
        .iter()
        .filter_map(|(canonical, aliases)| {
            aliases
                .iter()
                .filter_map(|alias| fields.get(*alias))
                .find(|value| !value.is_null())
                .map(|value| (canonical.to_string(), value.clone()))
        })
        .collect()
}

fn as_record(raw: &Value, what: &str) -> Result<Map<String, Value>> {
    raw.as_object().cloned().ok_or_else(|| {
        SpiceboxError::invalid(format!("Invalid {} structure: expected an object", what))
    })
}

fn as_list<'a>(raw: &'a Value, what: &str) -> Result<&'a Vec<Value>> {
    raw.as_array().ok_or_else(|| {
        SpiceboxError::invalid(format!("Invalid {} payload: expected a list", what))
    })
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

fn quantity_is_numeric(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Number(_)) => true,
        Some(Value::String(s)) => parse_quantity(s).is_some(),
        _ => false,
    }
}

/// Map a raw recipe onto the canonical schema and check what normalization cannot repair.
fn prepare_recipe(raw: &Value) -> Result<Value> {
    let mut recipe = map_aliases(&as_record(raw, "recipe")?, RECIPE_ALIASES);

    if is_blank(recipe.get("name")) || is_blank(recipe.get("steps")) {
        return Err(SpiceboxError::invalid("Invalid recipe structure"));
    }
    let items = match recipe.get("ingredients") {
        Some(Value::Array(items)) => items.clone(),
        _ => return Err(SpiceboxError::invalid("Invalid recipe structure")),
    };

    let mut ingredients = Vec::with_capacity(items.len());
    for item in &items {
        let ingredient = map_aliases(&as_record(item, "ingredient")?, INGREDIENT_ALIASES);
        if !quantity_is_numeric(ingredient.get("quantity")) {
            let label = ingredient
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or("?");
            return Err(SpiceboxError::invalid(format!(
                "Invalid quantity for ingredient '{}'",
                label
            )));
        }
        ingredients.push(normalize_universal_input(&Value::Object(ingredient)));
    }

    recipe.insert("ingredients".to_string(), Value::Array(ingredients));
    Ok(normalize_universal_input(&Value::Object(recipe)))
}

/// Pairing lists may arrive as a comma-separated string or a list of names.
fn pairing_names(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => s.split(',').map(|n| n.trim().to_string()).collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|n| n.trim().to_string())
            .collect(),
        _ => Vec::new(),
    }
    .into_iter()
    .filter(|n| !n.is_empty())
    .collect()
}

#[derive(Clone)]
pub struct ImportGateway {
    recipes: RecipeManager,
    spices: SpiceManager,
    bridge: SpiceBridge,
}

impl ImportGateway {
    pub fn new(recipes: RecipeManager, spices: SpiceManager, bridge: SpiceBridge) -> Self {
        Self {
            recipes,
            spices,
            bridge,
        }
    }

    /// Import one recipe from an external payload and store it.
    ///
    /// # Example
    /// ```
    /// use serde_json::json;
    /// use spicebox::Spicebox;
    ///
    /// let app = Spicebox::in_memory().unwrap();
    /// let recipe = app.importer.import_recipe(&json!({
    ///     "title": "tomato soup",
    ///     "instructions": "simmer",
    ///     "items": [{"ingredient": "tomato", "qty": "4", "measure": "unit"}]
    /// })).unwrap();
    /// assert_eq!(recipe.name, "Tomato Soup");
    /// assert_eq!(recipe.ingredients[0].unit, "Unit");
    /// ```
    pub fn import_recipe(&self, raw: &Value) -> Result<Recipe> {
        let prepared = prepare_recipe(raw)?;
        let recipe = validate_and_clean_recipe(&prepared)?;
        debug!("importing recipe '{}'", recipe.name);
        self.recipes.create(recipe)
    }

    /// Import a list of recipes, reporting each one separately.
    pub fn import_recipes(&self, raw: &Value) -> Result<Vec<ImportOutcome>> {
        let outcomes: Vec<ImportOutcome> = as_list(raw, "recipe")?
            .iter()
            .map(|item| match self.import_recipe(item) {
                Ok(data) => ImportOutcome::Success { data },
                Err(e) => {
                    warn!("Skipping recipe: {}", e);
                    ImportOutcome::Error {
                        message: e.to_string(),
                    }
                }
            })
            .collect();

        info!(
            "Imported {} of {} recipes",
            outcomes.iter().filter(|o| o.is_success()).count(),
            outcomes.len()
        );
        Ok(outcomes)
    }

    /// Import one spice and link it to every listed recipe that exists.
    pub fn import_spice(&self, raw: &Value) -> Result<SpiceImport> {
        let mut mapped = map_aliases(&as_record(raw, "spice")?, SPICE_ALIASES);
        for key in ["pairs_with_ingredients", "pairs_with_recipes"] {
            if mapped.contains_key(key) {
                let names = pairing_names(mapped.get(key));
                mapped.insert(key.to_string(), Value::from(names));
            }
        }

        let spice: Spice = clean_into(&Value::Object(mapped), SPICE_CLEANING)?;
        let spice = self.spices.insert(spice)?;

        let mut linked_recipes = Vec::new();
        for recipe in &spice.pairs_with_recipes {
            match self.bridge.link(&spice.name, recipe) {
                Ok(link) => linked_recipes.push(link.recipe_name),
                Err(SpiceboxError::NotFound(msg)) => {
                    debug!("Not linking '{}': {}", spice.name, msg)
                }
                Err(SpiceboxError::AlreadyExists(_)) => {}
                Err(e) => return Err(e),
            }
        }
        for recipe in &linked_recipes {
            self.bridge.learn_from_recipe(recipe)?;
        }

        Ok(SpiceImport {
            imported: spice.name.clone(),
            linked_recipes,
            data: spice,
        })
    }

    pub fn import_spices(&self, raw: &Value) -> Result<BulkSpiceReport> {
        let mut imported_spices = Vec::new();
        let mut failed = Vec::new();

        for item in as_list(raw, "spice")? {
            match self.import_spice(item) {
                Ok(import) => imported_spices.push(import.imported),
                Err(e) => {
                    warn!("Skipping spice: {}", e);
                    let name = item
                        .get("name")
                        .or_else(|| item.get("title"))
                        .and_then(Value::as_str)
                        .map(str::to_string);
                    failed.push(FailedSpice {
                        name,
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Spice import completed: {} imported, {} failed",
            imported_spices.len(),
            failed.len()
        );
        Ok(BulkSpiceReport {
            status: "completed",
            success_count: imported_spices.len(),
            error_count: failed.len(),
            imported_spices,
            failed,
        })
    }
}
