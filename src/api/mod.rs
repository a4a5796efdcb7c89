//! JSON HTTP surface.
//!
//! Each endpoint group lives in its own module and contributes a router; they are merged
//! here over a shared [`Spicebox`]. Path segments name the entity being addressed and are
//! folded into the request body before the manager cleans it.

mod import;
mod ingredients;
mod recipes;
mod spices;

use crate::error::{Result, SpiceboxError};
use crate::Spicebox;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use log::{error, info, warn};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::net::TcpListener;

pub type AppState = Arc<Spicebox>;

/// Response envelope shared by every endpoint
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            status: "success",
            message: None,
            data: Some(data),
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            status: "success",
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: Some(message.into()),
            data: None,
        }
    }
}

impl SpiceboxError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SpiceboxError::NotFound(_) => StatusCode::NOT_FOUND,
            SpiceboxError::AlreadyExists(_) => StatusCode::CONFLICT,
            SpiceboxError::InvalidStructure(_) | SpiceboxError::Json(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            SpiceboxError::NormalizationFailed(_) => StatusCode::BAD_REQUEST,
            SpiceboxError::Database(_)
            | SpiceboxError::Config(_)
            | SpiceboxError::Io(_)
            | SpiceboxError::StoreUnavailable(_)
            | SpiceboxError::Background(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SpiceboxError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed ({}): {}", self.kind(), self);
        } else {
            warn!("Request rejected ({}): {}", self.kind(), self);
        }

        let body = serde_json::json!({
            "status": "error",
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

/// Run manager calls on tokio's blocking pool; SQLite access and the store locks stay off
/// the async workers.
pub(crate) async fn blocking<T, F>(app: &AppState, f: F) -> Result<T>
where
    F: FnOnce(&Spicebox) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let app = Arc::clone(app);
    tokio::task::spawn_blocking(move || f(&app))
        .await
        .map_err(|e| SpiceboxError::Background(format!("store task failed: {}", e)))?
}

/// Unwrap a JSON body, turning a malformed one into an ordinary validation error.
pub(crate) fn body(payload: std::result::Result<Json<Value>, JsonRejection>) -> Result<Value> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| SpiceboxError::invalid(format!("Invalid JSON body: {}", e.body_text())))
}

/// Fold path parameters into an object body. Non-object bodies are left alone for the
/// cleaner to reject.
pub(crate) fn with_path(mut body: Value, params: &[(&str, &str)]) -> Value {
    if let Value::Object(fields) = &mut body {
        for (key, value) in params {
            fields.insert(key.to_string(), Value::String(value.to_string()));
        }
    }
    body
}

async fn health() -> Json<Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Build the application router.
pub fn router(app: Spicebox) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(recipes::routes())
        .merge(ingredients::routes())
        .merge(spices::routes())
        .merge(import::routes())
        .with_state(Arc::new(app))
}

/// Serve the API on an already bound listener until ctrl-c.
pub async fn serve(listener: TcpListener, app: Spicebox) -> Result<()> {
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
