//! Report Endpoints
//! Mission: Student report CRUD with referenced records resolved on read

use crate::api::error::ApiError;
use crate::api::routes::AppState;
use crate::auth::{require_admin, Claims};
use crate::store::records::RecordKind;
use crate::store::reports::{
    resolve_report, CreateReportRequest, ResolvedReport, UpdateReportRequest,
};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde_json::{json, Value};
use uuid::Uuid;

pub async fn create_report(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Json(req): Json<CreateReportRequest>,
) -> Result<(StatusCode, Json<ResolvedReport>), ApiError> {
    if req.title.trim().is_empty() {
        return Err(ApiError::Validation("Title is required".into()));
    }

    let report = state.reports.create(&claims.user_id()?, &req)?;
    let resolved = resolve_report(report, &state.records)?;
    Ok((StatusCode::CREATED, Json(resolved)))
}

pub async fn list_reports(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> Result<Json<Vec<ResolvedReport>>, ApiError> {
    let resolved = state
        .reports
        .list(&claims.user_id()?)?
        .into_iter()
        .map(|r| resolve_report(r, &state.records))
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Json(resolved))
}

/// Every report across all users, for admin review.
pub async fn list_all_reports(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> Result<Json<Vec<ResolvedReport>>, ApiError> {
    require_admin(&claims)
        .map_err(|_| ApiError::Forbidden("Access denied: Not an admin".into()))?;

    let resolved = state
        .reports
        .list_all()?
        .into_iter()
        .map(|r| resolve_report(r, &state.records))
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Json(resolved))
}

/// Everything the report form can reference: the caller's records of each
/// linkable kind.
pub async fn report_options(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let user_id = claims.user_id()?;

    Ok(Json(json!({
        "courses": state.records.list(RecordKind::Course, &user_id)?,
        "notes": state.records.list(RecordKind::Note, &user_id)?,
        "difficulties": state.records.list(RecordKind::Difficulty, &user_id)?,
        "achievements": state.records.list(RecordKind::Achievement, &user_id)?,
        "events": state.records.list(RecordKind::Event, &user_id)?,
        "certificates": state.records.list(RecordKind::Certificate, &user_id)?,
    })))
}

pub async fn get_report(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ResolvedReport>, ApiError> {
    let id = parse_id(&id)?;

    let report = state
        .reports
        .get(&id, &claims.user_id()?)?
        .ok_or_else(|| ApiError::NotFound("Report not found".into()))?;

    Ok(Json(resolve_report(report, &state.records)?))
}

pub async fn update_report(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateReportRequest>,
) -> Result<Json<ResolvedReport>, ApiError> {
    let id = parse_id(&id)?;

    let report = state
        .reports
        .update(&id, &claims.user_id()?, &req)?
        .ok_or_else(|| ApiError::NotFound("Report not found".into()))?;

    Ok(Json(resolve_report(report, &state.records)?))
}

pub async fn delete_report(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;

    if !state.reports.delete(&id, &claims.user_id()?)? {
        return Err(ApiError::NotFound("Report not found".into()));
    }

    Ok(Json(json!({ "message": "Report deleted" })))
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::Validation("Invalid id".into()))
}
