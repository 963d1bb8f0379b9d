//! CRUD handlers for `/api/temperatures`.
//!
//! Handlers validate input, hit the storage gateway, then trigger the
//! change notifier on a detached task — the HTTP response never waits
//! on broadcast completion, and a notification failure never changes
//! the response already decided.

use crate::domain::error::{ApiError, ApiResult};
use crate::http::routes::AppState;
use crate::snapshot::{compute_snapshot, compute_summary};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Success envelope: `{message, data}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub message: &'static str,
    pub data: T,
}

impl<T> ApiResponse<T> {
    fn new(message: &'static str, data: T) -> Self {
        Self { message, data }
    }
}

/// Request body for create and update.
///
/// Fields are optional at the deserialization layer so that missing
/// values surface as `ValidationError` (400) rather than a framework
/// rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ReadingInput {
    pub city: Option<String>,
    pub temperature: Option<f64>,
}

impl ReadingInput {
    /// Validate: `city` non-empty, `temperature` present and finite.
    fn validate(self) -> ApiResult<(String, f64)> {
        let city = self
            .city
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ApiError::validation("city is required"))?;

        let temperature = self
            .temperature
            .ok_or_else(|| ApiError::validation("temperature is required"))?;
        if !temperature.is_finite() {
            return Err(ApiError::validation("temperature must be a finite number"));
        }

        Ok((city, temperature))
    }
}

/// Coerce the loosely-typed body into [`ReadingInput`]; wrong field
/// types map to the 400 envelope.
fn parse_input(body: serde_json::Value) -> ApiResult<ReadingInput> {
    serde_json::from_value(body).map_err(|e| ApiError::validation(format!("invalid body: {e}")))
}

/// Unwrap the body extractor; a syntactically malformed or missing
/// JSON body maps to the 400 envelope instead of the framework's
/// plain-text rejection.
fn take_body(body: Result<Json<serde_json::Value>, JsonRejection>) -> ApiResult<serde_json::Value> {
    let Json(value) = body.map_err(|e| ApiError::validation(format!("invalid body: {e}")))?;
    Ok(value)
}

/// Unwrap the path extractor; a non-numeric id maps to the 400
/// envelope instead of the framework's plain-text rejection.
fn take_id(id: Result<Path<i32>, PathRejection>) -> ApiResult<i32> {
    let Path(id) = id.map_err(|e| ApiError::validation(format!("invalid id: {e}")))?;
    Ok(id)
}

/// GET / — full snapshot (summary + ordered list)
pub async fn list(State(state): State<AppState>) -> Response {
    match compute_snapshot(state.store.as_ref()).await {
        Ok(snapshot) => Json(ApiResponse::new("Successfully retrieved all data", snapshot))
            .into_response(),
        Err(e) => state.render_error(e.into()),
    }
}

/// GET /average — current average temperature
pub async fn average(State(state): State<AppState>) -> Response {
    match compute_summary(state.store.as_ref()).await {
        Ok(summary) => Json(ApiResponse::new(
            "Successfully retrieved average temperature",
            json!({ "average": summary.average }),
        ))
        .into_response(),
        Err(e) => state.render_error(e.into()),
    }
}

/// GET /:id — single reading
pub async fn get_by_id(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Response {
    let result: ApiResult<_> = async {
        let id = take_id(id)?;
        state
            .store
            .get(id)
            .await?
            .ok_or(ApiError::NotFound)
    }
    .await;

    match result {
        Ok(reading) => Json(ApiResponse::new("Successfully retrieved data by ID", reading))
            .into_response(),
        Err(e) => state.render_error(e),
    }
}

/// POST / — create a reading (201)
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Response {
    let result: ApiResult<_> = async {
        let (city, temperature) = parse_input(take_body(body)?)?.validate()?;
        let reading = state.store.insert(&city, temperature).await?;
        Ok(reading)
    }
    .await;

    match result {
        Ok(reading) => {
            state.notifier.spawn_notify();
            (
                StatusCode::CREATED,
                Json(ApiResponse::new("Successfully created new data", reading)),
            )
                .into_response()
        }
        Err(e) => state.render_error(e),
    }
}

/// PUT /:id — update a reading
pub async fn update(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Response {
    let result: ApiResult<_> = async {
        let id = take_id(id)?;
        let (city, temperature) = parse_input(take_body(body)?)?.validate()?;
        state
            .store
            .update(id, &city, temperature)
            .await?
            .ok_or(ApiError::NotFound)
    }
    .await;

    match result {
        Ok(reading) => {
            state.notifier.spawn_notify();
            Json(ApiResponse::new("Successfully updated data", reading)).into_response()
        }
        Err(e) => state.render_error(e),
    }
}

/// DELETE /:id — remove a reading, returning the deleted row
pub async fn delete(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Response {
    let result: ApiResult<_> = async {
        let id = take_id(id)?;
        state
            .store
            .delete(id)
            .await?
            .ok_or(ApiError::NotFound)
    }
    .await;

    match result {
        Ok(reading) => {
            state.notifier.spawn_notify();
            Json(ApiResponse::new("Successfully deleted data", reading)).into_response()
        }
        Err(e) => state.render_error(e),
    }
}

/// PATCH /randomize — re-draw every temperature in one batch
pub async fn randomize(State(state): State<AppState>) -> Response {
    match state.store.randomize_all().await {
        Ok(list) => {
            // One notification for the whole batch, not one per row.
            state.notifier.spawn_notify();
            Json(ApiResponse::new(
                "Successfully randomized all temperatures",
                json!({ "list": list }),
            ))
            .into_response()
        }
        Err(e) => state.render_error(e.into()),
    }
}

/// GET /api/health
pub async fn health() -> Response {
    Json(json!({ "status": "OK" })).into_response()
}
