use super::{blocking, body, ApiResponse, AppState};
use crate::error::Result;
use crate::import::{BulkSpiceReport, ImportOutcome, SpiceImport};
use crate::model::Recipe;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/import/recipe", post(import_recipe))
        .route("/import/bulk", post(import_recipes))
        .route("/import/spice", post(import_spice))
        .route("/import/bulkspices", post(import_spices))
}

async fn import_recipe(
    State(app): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Recipe>>)> {
    let raw = body(payload)?;
    let recipe = blocking(&app, move |app| app.importer.import_recipe(&raw)).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::data(recipe))))
}

/// Per-item outcomes; the request succeeds even when some items fail.
async fn import_recipes(
    State(app): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Vec<ImportOutcome>>)> {
    let raw = body(payload)?;
    let outcomes = blocking(&app, move |app| app.importer.import_recipes(&raw)).await?;
    Ok((StatusCode::CREATED, Json(outcomes)))
}

async fn import_spice(
    State(app): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<SpiceImport>>)> {
    let raw = body(payload)?;
    let import = blocking(&app, move |app| app.importer.import_spice(&raw)).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            format!("Spice '{}' imported.", import.imported),
            import,
        )),
    ))
}

async fn import_spices(
    State(app): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<BulkSpiceReport>)> {
    let raw = body(payload)?;
    let report = blocking(&app, move |app| app.importer.import_spices(&raw)).await?;
    Ok((StatusCode::CREATED, Json(report)))
}
