use super::{blocking, body, with_path, ApiResponse, AppState};
use crate::error::Result;
use crate::model::{Ingredient, RenameRequest, UnitChange};
use crate::normalizer::normalize_name;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde_json::Value;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/ingredients", get(list_ingredients).post(add_ingredient))
        .route(
            "/ingredients/:name",
            get(get_ingredient).delete(remove_ingredient),
        )
        .route("/ingredients/:name/name", put(rename_ingredient))
        .route("/ingredients/:name/unit", put(set_ingredient_unit))
}

async fn list_ingredients(State(app): State<AppState>) -> Result<Json<ApiResponse<Vec<Ingredient>>>> {
    let ingredients = blocking(&app, |app| app.ingredients.list()).await?;
    Ok(Json(ApiResponse::data(ingredients)))
}

async fn add_ingredient(
    State(app): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Ingredient>>)> {
    let raw = body(payload)?;
    let ingredient = blocking(&app, move |app| app.ingredients.add(&raw)).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            format!("Ingredient '{}' added.", ingredient.name),
            ingredient,
        )),
    ))
}

async fn get_ingredient(
    State(app): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<Ingredient>>> {
    let ingredient = blocking(&app, move |app| app.ingredients.get(&name)).await?;
    Ok(Json(ApiResponse::data(ingredient)))
}

async fn remove_ingredient(
    State(app): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    let name = normalize_name(&name);
    let removed = name.clone();
    blocking(&app, move |app| app.ingredients.remove(&removed)).await?;
    Ok(Json(ApiResponse::message(format!("Ingredient '{}' removed.", name))))
}

async fn rename_ingredient(
    State(app): State<AppState>,
    Path(name): Path<String>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<RenameRequest>>> {
    let request = with_path(body(payload)?, &[("old_name", name.as_str())]);
    let renamed = blocking(&app, move |app| app.ingredients.rename(&request)).await?;
    Ok(Json(ApiResponse::with_message(
        format!(
            "Ingredient '{}' renamed to '{}'.",
            renamed.old_name, renamed.new_name
        ),
        renamed,
    )))
}

async fn set_ingredient_unit(
    State(app): State<AppState>,
    Path(name): Path<String>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<UnitChange>>> {
    let request = with_path(body(payload)?, &[("name", name.as_str())]);
    let change = blocking(&app, move |app| app.ingredients.set_unit(&request)).await?;
    Ok(Json(ApiResponse::with_message("Unit updated.", change)))
}
