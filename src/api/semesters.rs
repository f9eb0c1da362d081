//! Semester Endpoints
//! Mission: Semester CRUD with server-side GPA and aggregate cascade on delete

use crate::api::error::ApiError;
use crate::api::routes::AppState;
use crate::auth::{require_admin, Claims};
use crate::store::semesters::{
    self, CourseEntry, CreateSemesterRequest, Semester, University, UpdateSemesterRequest,
};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

/// Same course schema check for create and update paths.
fn validate_courses(courses: &[CourseEntry]) -> Result<(), ApiError> {
    for course in courses {
        if course.credits < 0.0 || course.grade < 0.0 {
            return Err(ApiError::Validation(
                "Course credits and grades must be non-negative".into(),
            ));
        }
    }
    Ok(())
}

pub async fn create_semester(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Json(req): Json<CreateSemesterRequest>,
) -> Result<(StatusCode, Json<Semester>), ApiError> {
    if req.semester_number < 1 {
        return Err(ApiError::Validation("Semester number must be positive".into()));
    }
    validate_courses(&req.courses)?;

    let semester = state.semesters.create(&claims.user_id()?, &req)?;
    Ok((StatusCode::CREATED, Json(semester)))
}

pub async fn list_semesters(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Semester>>, ApiError> {
    let semesters = state.semesters.list(&claims.user_id()?)?;
    Ok(Json(semesters))
}

pub async fn get_semester(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Semester>, ApiError> {
    let id = parse_id(&id)?;

    state
        .semesters
        .get(&id, &claims.user_id()?)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Semester not found".into()))
}

pub async fn update_semester(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateSemesterRequest>,
) -> Result<Json<Semester>, ApiError> {
    let id = parse_id(&id)?;

    if let Some(number) = req.semester_number {
        if number < 1 {
            return Err(ApiError::Validation("Semester number must be positive".into()));
        }
    }
    if let Some(courses) = &req.courses {
        validate_courses(courses)?;
    }

    state
        .semesters
        .update(&id, &claims.user_id()?, &req)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Semester not found".into()))
}

/// Deleting a semester re-derives the aggregate GPA of every university
/// that references it before the row goes away.
pub async fn delete_semester(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let user_id = claims.user_id()?;

    if !semesters::delete_semester(&state.semesters, &state.universities, &id, &user_id)? {
        return Err(ApiError::NotFound("Semester not found".into()));
    }

    info!("🗑️ Semester {} deleted, aggregates recomputed", id);

    Ok(Json(json!({ "message": "Semester deleted" })))
}

#[derive(Debug, Deserialize)]
pub struct CreateUniversityRequest {
    pub name: String,
    pub university_type: String,
}

/// Admin-only: seed a university aggregate.
pub async fn create_university(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Json(req): Json<CreateUniversityRequest>,
) -> Result<(StatusCode, Json<University>), ApiError> {
    admin_only(&claims)?;

    if req.name.trim().is_empty() {
        return Err(ApiError::Validation("University name is required".into()));
    }

    let university = state.universities.create(req.name.trim(), &req.university_type)?;
    info!("🎓 University {} created", university.id);

    Ok((StatusCode::CREATED, Json(university)))
}

/// Admin-only: every university aggregate with its current mean GPA.
pub async fn list_universities(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> Result<Json<Vec<University>>, ApiError> {
    admin_only(&claims)?;
    Ok(Json(state.universities.list_all()?))
}

/// Admin-only: link a semester into a university and recompute its GPA.
pub async fn attach_semester(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path((university_id, semester_id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    admin_only(&claims)?;

    let university_id = parse_id(&university_id)?;
    let semester_id = parse_id(&semester_id)?;

    if !semesters::attach_semester(
        &state.semesters,
        &state.universities,
        &university_id,
        &semester_id,
    )? {
        return Err(ApiError::NotFound("University or semester not found".into()));
    }

    Ok(Json(json!({ "message": "Semester attached" })))
}

fn admin_only(claims: &Claims) -> Result<(), ApiError> {
    require_admin(claims).map_err(|_| ApiError::Forbidden("Access denied: Not an admin".into()))
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::Validation("Invalid id".into()))
}
