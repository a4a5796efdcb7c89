use super::{blocking, body, with_path, ApiResponse, AppState};
use crate::error::Result;
use crate::model::{RecipeSpice, Spice, SpiceSummary};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/spices",
            get(list_spices).post(add_spice).put(update_spice),
        )
        .route("/spices/:name", get(get_spice))
        .route("/spices/:name/links", post(link_spice))
        .route("/spices/:name/links/:recipe", delete(unlink_spice))
}

async fn list_spices(State(app): State<AppState>) -> Result<Json<ApiResponse<Vec<SpiceSummary>>>> {
    let spices = blocking(&app, |app| app.spices.list()).await?;
    Ok(Json(ApiResponse::data(spices)))
}

async fn add_spice(
    State(app): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Spice>>)> {
    let raw = body(payload)?;
    let spice = blocking(&app, move |app| app.spices.add(&raw)).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            format!("Spice '{}' added.", spice.name),
            spice,
        )),
    ))
}

async fn get_spice(
    State(app): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<Spice>>> {
    let spice = blocking(&app, move |app| app.spices.get(&name)).await?;
    Ok(Json(ApiResponse::data(spice)))
}

async fn update_spice(
    State(app): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<Spice>>> {
    let raw = body(payload)?;
    let spice = blocking(&app, move |app| app.spices.update(&raw)).await?;
    Ok(Json(ApiResponse::with_message(
        format!("Spice '{}' updated.", spice.name),
        spice,
    )))
}

/// Link the spice in the path to the recipe named by `recipe_name` in the body.
async fn link_spice(
    State(app): State<AppState>,
    Path(name): Path<String>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<RecipeSpice>>)> {
    let request = with_path(body(payload)?, &[("spice_name", name.as_str())]);
    let link = blocking(&app, move |app| app.spices.link(&request)).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            format!("'{}' linked to '{}'.", link.spice_name, link.recipe_name),
            link,
        )),
    ))
}

async fn unlink_spice(
    State(app): State<AppState>,
    Path((name, recipe)): Path<(String, String)>,
) -> Result<Json<ApiResponse<RecipeSpice>>> {
    let request = json!({"spice_name": name, "recipe_name": recipe});
    let link = blocking(&app, move |app| app.spices.unlink(&request)).await?;
    Ok(Json(ApiResponse::with_message(
        format!("'{}' unlinked from '{}'.", link.spice_name, link.recipe_name),
        link,
    )))
}
