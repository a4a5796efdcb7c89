use super::{apply_cleaning, type_name, CleaningMap, FieldCleaner};
use crate::error::{Result, SpiceboxError};
use crate::model::{NewRecipe, RecipeIngredient};
use log::debug;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub const INGREDIENT_CLEANING: CleaningMap = &[
    ("name", FieldCleaner::String),
    ("quantity", FieldCleaner::Quantity),
    ("unit", FieldCleaner::Unit),
];

/// Top-level recipe fields; nested ingredients go through [`INGREDIENT_CLEANING`]
pub const RECIPE_CLEANING: CleaningMap = &[
    ("name", FieldCleaner::String),
    ("steps", FieldCleaner::String),
    ("spices", FieldCleaner::NameList),
];

pub const SPICE_CLEANING: CleaningMap = &[
    ("name", FieldCleaner::String),
    ("flavor_profile", FieldCleaner::Text),
    ("recommended_quantity", FieldCleaner::Text),
    ("pairs_with_ingredients", FieldCleaner::NameList),
    ("pairs_with_recipes", FieldCleaner::NameList),
];

pub const RENAME_CLEANING: CleaningMap = &[
    ("old_name", FieldCleaner::String),
    ("new_name", FieldCleaner::String),
];

pub const INGREDIENT_SWAP_CLEANING: CleaningMap = &[
    ("recipe_name", FieldCleaner::String),
    ("old_ingredient", FieldCleaner::String),
    ("new_ingredient", FieldCleaner::String),
    ("unit", FieldCleaner::Unit),
];

pub const QUANTITY_CHANGE_CLEANING: CleaningMap = &[
    ("recipe_name", FieldCleaner::String),
    ("ingredient", FieldCleaner::String),
    ("new_quantity", FieldCleaner::Quantity),
];

pub const UNIT_CHANGE_CLEANING: CleaningMap = &[
    ("name", FieldCleaner::String),
    ("new_unit", FieldCleaner::Unit),
];

pub const LINK_CLEANING: CleaningMap = &[
    ("spice_name", FieldCleaner::String),
    ("recipe_name", FieldCleaner::String),
];

/// Reject a name that cleaned down to nothing or that contains a comma. Pairing lists
/// are stored comma-delimited, so a comma inside a name could never be found again.
pub fn require_name(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(SpiceboxError::invalid(format!(
            "Invalid structure: {} cannot be empty",
            field
        )));
    }
    if value.contains(',') {
        return Err(SpiceboxError::invalid(format!(
            "Invalid structure: {} cannot contain commas",
            field
        )));
    }
    Ok(())
}

/// Clean a record with an explicit map and deserialize it into a typed request.
///
/// Cleaner failures surface as [`SpiceboxError::NormalizationFailed`], shape problems
/// (missing fields, `null` quantities, wrong types) as [`SpiceboxError::InvalidStructure`].
pub fn clean_into<T: DeserializeOwned>(raw: &Value, map: CleaningMap) -> Result<T> {
    if !raw.is_object() {
        return Err(SpiceboxError::invalid(format!(
            "Invalid structure: expected an object, found {}",
            type_name(raw)
        )));
    }
    let cleaned = apply_cleaning(raw, map)?;
    serde_json::from_value(Value::Object(cleaned))
        .map_err(|e| SpiceboxError::invalid(format!("Invalid structure: {}", e)))
}

/// Clean and validate one recipe ingredient (name, quantity and unit are all required).
///
/// # Example
/// ```
/// use serde_json::json;
/// use spicebox::normalizer::validate_and_clean_ingredient;
///
/// let ingredient = validate_and_clean_ingredient(&json!({
///     "name": "  flour ", "quantity": " 200 ", "unit": "gramas"
/// })).unwrap();
/// assert_eq!(ingredient.name, "Flour");
/// assert_eq!(ingredient.quantity, 200.0);
/// assert_eq!(ingredient.unit, "Grm");
/// ```
pub fn validate_and_clean_ingredient(raw: &Value) -> Result<RecipeIngredient> {
    let label = raw
        .get("name")
        .and_then(Value::as_str)
        .map(|n| n.trim().to_string())
        .unwrap_or_else(|| "?".to_string());

    clean_into::<RecipeIngredient>(raw, INGREDIENT_CLEANING)
        .and_then(|ingredient| {
            require_name("name", &ingredient.name)?;
            Ok(ingredient)
        })
        .map_err(|e| match e {
        SpiceboxError::InvalidStructure(msg) => {
            SpiceboxError::InvalidStructure(format!("Ingredient '{}': {}", label, msg))
        }
        other => other,
    })
}

/// Clean and validate a full recipe, including its nested ingredients.
pub fn validate_and_clean_recipe(raw: &Value) -> Result<NewRecipe> {
    let fields = raw.as_object().ok_or_else(|| {
        SpiceboxError::invalid(format!(
            "Invalid recipe structure: expected an object, found {}",
            type_name(raw)
        ))
    })?;

    let mut cleaned = apply_cleaning(raw, RECIPE_CLEANING)?;

    let ingredients = match fields.get("ingredients") {
        Some(Value::Array(items)) => items
            .iter()
            .map(validate_and_clean_ingredient)
            .collect::<Result<Vec<_>>>()?,
        Some(other) => {
            return Err(SpiceboxError::invalid(format!(
                "Invalid recipe structure: ingredients must be a list, found {}",
                type_name(other)
            )))
        }
        None => {
            return Err(SpiceboxError::invalid(
                "Invalid recipe structure: missing ingredients",
            ))
        }
    };
    cleaned.insert("ingredients".to_string(), serde_json::to_value(&ingredients)?);

    let recipe: NewRecipe = serde_json::from_value(Value::Object(cleaned))
        .map_err(|e| SpiceboxError::invalid(format!("Invalid recipe structure: {}", e)))?;

    require_name("name", &recipe.name)?;
    if recipe.steps.is_empty() {
        return Err(SpiceboxError::invalid(
            "Invalid recipe structure: steps cannot be empty",
        ));
    }

    debug!(
        "validated recipe '{}' with {} ingredients",
        recipe.name,
        recipe.ingredients.len()
    );
    Ok(recipe)
}
