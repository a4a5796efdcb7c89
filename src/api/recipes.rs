use super::{blocking, body, with_path, ApiResponse, AppState};
use crate::error::Result;
use crate::model::{
    IngredientSwap, QuantityChange, Recipe, RecipeSummary, RenameRequest, SpiceSuggestion,
};
use crate::normalizer::normalize_name;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use serde_json::Value;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recipes).post(add_recipe))
        .route("/recipes/:name", get(get_recipe).delete(remove_recipe))
        .route("/recipes/:name/name", put(rename_recipe))
        .route("/recipes/:name/spice-suggestions", get(suggest_spices))
        .route(
            "/recipes/:name/ingredients/:ingredient",
            delete(remove_recipe_ingredient),
        )
        .route(
            "/recipes/:name/ingredients/:ingredient/name",
            put(swap_recipe_ingredient),
        )
        .route(
            "/recipes/:name/ingredients/:ingredient/quantity",
            put(set_recipe_quantity),
        )
}

async fn list_recipes(State(app): State<AppState>) -> Result<Json<ApiResponse<Vec<RecipeSummary>>>> {
    let recipes = blocking(&app, |app| app.recipes.list()).await?;
    Ok(Json(ApiResponse::data(recipes)))
}

async fn add_recipe(
    State(app): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Recipe>>)> {
    let raw = body(payload)?;
    let recipe = blocking(&app, move |app| app.recipes.add(&raw)).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            format!("Recipe '{}' added.", recipe.name),
            recipe,
        )),
    ))
}

async fn get_recipe(
    State(app): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<Recipe>>> {
    let recipe = blocking(&app, move |app| app.recipes.get(&name)).await?;
    Ok(Json(ApiResponse::data(recipe)))
}

async fn remove_recipe(
    State(app): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    let name = normalize_name(&name);
    let removed = name.clone();
    blocking(&app, move |app| app.recipes.remove(&removed)).await?;
    Ok(Json(ApiResponse::message(format!("Recipe '{}' removed.", name))))
}

async fn rename_recipe(
    State(app): State<AppState>,
    Path(name): Path<String>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<RenameRequest>>> {
    let request = with_path(body(payload)?, &[("old_name", name.as_str())]);
    let renamed = blocking(&app, move |app| app.recipes.rename(&request)).await?;
    Ok(Json(ApiResponse::with_message(
        format!("Recipe '{}' renamed to '{}'.", renamed.old_name, renamed.new_name),
        renamed,
    )))
}

/// Spices ranked by how well they fit the recipe.
async fn suggest_spices(
    State(app): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<Vec<SpiceSuggestion>>>> {
    let suggestions = blocking(&app, move |app| app.spices.suggest(&name)).await?;
    Ok(Json(ApiResponse::data(suggestions)))
}

async fn remove_recipe_ingredient(
    State(app): State<AppState>,
    Path((name, ingredient)): Path<(String, String)>,
) -> Result<Json<ApiResponse<()>>> {
    blocking(&app, move |app| app.recipes.remove_ingredient(&name, &ingredient)).await?;
    Ok(Json(ApiResponse::message("Ingredient removed from recipe.")))
}

async fn swap_recipe_ingredient(
    State(app): State<AppState>,
    Path((name, ingredient)): Path<(String, String)>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<IngredientSwap>>> {
    let request = with_path(
        body(payload)?,
        &[("recipe_name", name.as_str()), ("old_ingredient", ingredient.as_str())],
    );
    let swap = blocking(&app, move |app| app.recipes.swap_ingredient(&request)).await?;
    Ok(Json(ApiResponse::with_message(
        format!(
            "'{}' replaced with '{}' in '{}'.",
            swap.old_ingredient, swap.new_ingredient, swap.recipe_name
        ),
        swap,
    )))
}

async fn set_recipe_quantity(
    State(app): State<AppState>,
    Path((name, ingredient)): Path<(String, String)>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<QuantityChange>>> {
    let request = with_path(
        body(payload)?,
        &[("recipe_name", name.as_str()), ("ingredient", ingredient.as_str())],
    );
    let change = blocking(&app, move |app| app.recipes.set_quantity(&request)).await?;
    Ok(Json(ApiResponse::with_message("Quantity updated.", change)))
}
