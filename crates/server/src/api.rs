//! JSON endpoints.
//!
//! Handlers are thin: decode the body, hand the blocking work to
//! [`SheetOperations`] on tokio's blocking pool, and shape the answer.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use sheetshape_core::{Mode, SheetError, SheetKey, SheetOperations};

use crate::status_codes::{status_for, STATUS_BAD_REQUEST, STATUS_INTERNAL};

/// Shared application state. `None` when no credentials were found; the
/// server still starts and every API call reports it.
#[derive(Clone)]
pub struct AppState {
    operations: Option<Arc<SheetOperations>>,
}

impl AppState {
    pub fn new(operations: Arc<SheetOperations>) -> Self {
        Self { operations: Some(operations) }
    }

    pub fn unauthenticated() -> Self {
        Self { operations: None }
    }

    fn operations(&self) -> Result<Arc<SheetOperations>, ApiError> {
        self.operations.clone().ok_or(ApiError::NotAuthenticated)
    }
}

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/sheets", post(list_sheets))
        .route("/columns", post(get_columns))
        .route("/save", post(save))
        .route("/revert", post(revert));

    Router::new()
        .nest("/api", api)
        .route("/health", get(health))
        .with_state(state)
}

/// Everything a handler can answer with besides success.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Sheet(#[from] SheetError),

    #[error("No authentication credentials.")]
    NotAuthenticated,

    #[error("Invalid request body: {0}")]
    BadBody(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Sheet(err) => status_for(err),
            ApiError::NotAuthenticated | ApiError::Internal(_) => STATUS_INTERNAL,
            ApiError::BadBody(_) => STATUS_BAD_REQUEST,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Sheet(err) => err.kind(),
            ApiError::NotAuthenticated => "not_authenticated",
            ApiError::BadBody(_) => "invalid_request",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadBody(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    kind: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::warn!("request failed ({}): {}", status.as_u16(), self);
        } else {
            log::debug!("request rejected ({}): {}", status.as_u16(), self);
        }
        let body = ErrorBody {
            error: self.to_string(),
            kind: self.kind(),
        };
        (status, Json(body)).into_response()
    }
}

/// Run a blocking operation off the async workers.
async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, SheetError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SheetsRequest {
    url: String,
}

#[derive(Debug, Serialize)]
struct SheetTitle {
    title: String,
}

#[derive(Debug, Serialize)]
struct SheetsResponse {
    sheets: Vec<SheetTitle>,
    spreadsheet_id: String,
}

/// Fields shared by every per-sheet request.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SheetRequest {
    spreadsheet_id: String,
    sheet_name: String,
}

impl SheetRequest {
    fn key(&self) -> SheetKey {
        sheet_key(&self.spreadsheet_id, &self.sheet_name)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SaveRequest {
    spreadsheet_id: String,
    sheet_name: String,
    new_order: Vec<String>,
    keep_selected_only: bool,
}

fn sheet_key(spreadsheet_id: &str, sheet_name: &str) -> SheetKey {
    SheetKey::new(spreadsheet_id.trim(), sheet_name)
}

#[derive(Debug, Serialize)]
struct SaveResponse {
    message: &'static str,
    revertible: bool,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: &'static str,
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_sheets(
    State(state): State<AppState>,
    body: Result<Json<SheetsRequest>, JsonRejection>,
) -> Result<Json<SheetsResponse>, ApiError> {
    let operations = state.operations()?;
    let Json(request) = body?;

    let listing = run_blocking(move || operations.list_sheets(&request.url)).await?;

    Ok(Json(SheetsResponse {
        sheets: listing
            .titles
            .into_iter()
            .map(|title| SheetTitle { title })
            .collect(),
        spreadsheet_id: listing.source.as_str().to_string(),
    }))
}

async fn get_columns(
    State(state): State<AppState>,
    body: Result<Json<SheetRequest>, JsonRejection>,
) -> Result<Json<Vec<String>>, ApiError> {
    let operations = state.operations()?;
    let Json(request) = body?;

    let header = run_blocking(move || operations.get_columns(&request.key())).await?;
    Ok(Json(header))
}

async fn save(
    State(state): State<AppState>,
    body: Result<Json<SaveRequest>, JsonRejection>,
) -> Result<Json<SaveResponse>, ApiError> {
    let operations = state.operations()?;
    let Json(request) = body?;
    let mode = Mode::from_keep_selected_only(request.keep_selected_only);

    let key = sheet_key(&request.spreadsheet_id, &request.sheet_name);

    let outcome = run_blocking(move || operations.save(&key, &request.new_order, mode)).await?;

    Ok(Json(SaveResponse {
        message: "Column order successfully saved.",
        revertible: outcome.revertible,
    }))
}

async fn revert(
    State(state): State<AppState>,
    body: Result<Json<SheetRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let operations = state.operations()?;
    let Json(request) = body?;

    run_blocking(move || operations.revert(&request.key())).await?;
    Ok(Json(MessageResponse { message: "Revert successful." }))
}
