//! Scholarship Endpoints
//! Mission: One scholarship profile per user, owner-scoped CRUD

use crate::api::error::ApiError;
use crate::api::routes::AppState;
use crate::auth::Claims;
use crate::store::scholarship::{
    CreateScholarshipRequest, ScholarshipStudent, UpdateScholarshipRequest,
};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde_json::{json, Value};
use uuid::Uuid;

pub async fn create_profile(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Json(req): Json<CreateScholarshipRequest>,
) -> Result<(StatusCode, Json<ScholarshipStudent>), ApiError> {
    let user_id = claims.user_id()?;

    if state.scholarships.get_by_user(&user_id)?.is_some() {
        return Err(ApiError::Conflict(
            "A scholarship profile already exists for this user".into(),
        ));
    }

    let profile = state.scholarships.create(&user_id, &req)?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn list_profiles(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> Result<Json<Vec<ScholarshipStudent>>, ApiError> {
    let profiles = state.scholarships.list(&claims.user_id()?)?;
    Ok(Json(profiles))
}

pub async fn get_profile(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ScholarshipStudent>, ApiError> {
    let id = parse_id(&id)?;

    state
        .scholarships
        .get(&id, &claims.user_id()?)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Scholarship profile not found".into()))
}

pub async fn update_profile(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateScholarshipRequest>,
) -> Result<Json<ScholarshipStudent>, ApiError> {
    let id = parse_id(&id)?;

    state
        .scholarships
        .update(&id, &claims.user_id()?, &req)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Scholarship profile not found".into()))
}

pub async fn delete_profile(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;

    if !state.scholarships.delete(&id, &claims.user_id()?)? {
        return Err(ApiError::NotFound("Scholarship profile not found".into()));
    }

    Ok(Json(json!({ "message": "Scholarship profile deleted" })))
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::Validation("Invalid id".into()))
}
