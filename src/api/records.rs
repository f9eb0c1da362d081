//! Record Endpoints
//! Mission: One CRUD surface shared by every simple record kind

use crate::api::error::ApiError;
use crate::api::routes::AppState;
use crate::auth::Claims;
use crate::store::records::{CreateRecordRequest, Record, RecordKind, UpdateRecordRequest};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde_json::{json, Value};
use uuid::Uuid;

/// Each record sub-router carries its kind as an `Extension`, so the same
/// handlers serve courses, notes, difficulties, and the rest.
pub async fn create_record(
    Extension(kind): Extension<RecordKind>,
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Json(req): Json<CreateRecordRequest>,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    if req.title.trim().is_empty() {
        return Err(ApiError::Validation("Title is required".into()));
    }

    let record = state.records.create(kind, &claims.user_id()?, &req)?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn list_records(
    Extension(kind): Extension<RecordKind>,
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let records = state.records.list(kind, &claims.user_id()?)?;
    Ok(Json(records))
}

pub async fn get_record(
    Extension(kind): Extension<RecordKind>,
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Record>, ApiError> {
    let id = parse_id(&id)?;

    state
        .records
        .get(kind, &id, &claims.user_id()?)?
        .map(Json)
        .ok_or_else(|| not_found(kind))
}

pub async fn update_record(
    Extension(kind): Extension<RecordKind>,
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateRecordRequest>,
) -> Result<Json<Record>, ApiError> {
    let id = parse_id(&id)?;

    state
        .records
        .update(kind, &id, &claims.user_id()?, &req)?
        .map(Json)
        .ok_or_else(|| not_found(kind))
}

pub async fn delete_record(
    Extension(kind): Extension<RecordKind>,
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;

    if !state.records.delete(kind, &id, &claims.user_id()?)? {
        return Err(not_found(kind));
    }

    Ok(Json(json!({ "message": "Deleted" })))
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::Validation("Invalid id".into()))
}

fn not_found(kind: RecordKind) -> ApiError {
    ApiError::NotFound(format!("{} not found", kind.as_str()))
}
