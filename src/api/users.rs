//! User Endpoints
//! Mission: Profile management plus admin user administration

use crate::aggregation::{profile_statistics, users_summary, SummaryCategory};
use crate::api::error::ApiError;
use crate::api::routes::AppState;
use crate::auth::models::UpdateUserRequest;
use crate::auth::user_store::{UserPage, UserPageQuery};
use crate::auth::{require_admin, Claims, Role};
use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

fn admin_only(claims: &Claims) -> Result<(), ApiError> {
    require_admin(claims).map_err(|_| ApiError::Forbidden("Access denied: Not an admin".into()))
}

/// Profile page payload: the user, their record counts, and the scholarship
/// profile when one exists.
pub async fn get_profile(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let user_id = claims.user_id()?;

    let user = state
        .users
        .get_by_id(&user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let statistics = profile_statistics(
        &user_id,
        &state.records,
        &state.semesters,
        &state.tickets,
        &state.reports,
    )?;

    let scholarship = state.scholarships.get_by_user(&user_id)?;

    Ok(Json(json!({
        "user": user,
        "statistics": statistics,
        "scholarshipProfile": scholarship,
    })))
}

pub async fn update_profile(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<Value>, ApiError> {
    let user_id = claims.user_id()?;

    // Role escalation is an admin operation.
    if req.role.is_some() && claims.role != Role::Admin {
        return Err(ApiError::Forbidden("Only admins can change roles".into()));
    }

    if let Some(password) = &req.password {
        if !crate::auth::models::password_meets_policy(password) {
            return Err(ApiError::Validation(
                "Password must be at least 8 characters and include a number and a symbol".into(),
            ));
        }
    }

    // Email changes race the UNIQUE column; reject taken addresses up front.
    if let Some(email) = &req.email {
        let email = email.trim().to_lowercase();
        if let Some(existing) = state.users.get_by_email(&email)? {
            if existing.id != user_id {
                return Err(ApiError::Conflict("Email already registered".into()));
            }
        }
    }

    let user = state
        .users
        .update_profile(&user_id, &req)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    info!("Profile updated for {}", user.email);

    Ok(Json(json!({ "message": "Profile updated", "user": user })))
}

pub async fn get_role(Extension(claims): Extension<Claims>) -> Json<Value> {
    Json(json!({ "role": claims.role }))
}

pub async fn get_user_by_id(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = Uuid::parse_str(&id).map_err(|_| ApiError::Validation("Invalid user id".into()))?;

    // Users can always read themselves; anyone else requires admin.
    if claims.user_id()? != id {
        admin_only(&claims)?;
    }

    let user = state
        .users
        .get_by_id(&id)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(Json(json!({ "user": user })))
}

pub async fn list_users(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    admin_only(&claims)?;

    let users = state.users.list_all()?;
    Ok(Json(json!({ "count": users.len(), "users": users })))
}

/// Paginated admin listing with role filter and name/email search.
pub async fn list_users_page(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Query(query): Query<UserPageQuery>,
) -> Result<Json<UserPage>, ApiError> {
    admin_only(&claims)?;

    let page = state.users.list_page(&query)?;
    Ok(Json(page))
}

pub async fn delete_user(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    admin_only(&claims)?;

    let id = Uuid::parse_str(&id).map_err(|_| ApiError::Validation("Invalid user id".into()))?;

    if !state.users.delete(&id)? {
        return Err(ApiError::NotFound("User not found".into()));
    }

    info!("🗑️ User {} deleted by admin {}", id, claims.email);

    Ok(Json(json!({ "message": "User deleted" })))
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub category: String,
}

/// Admin summary: every user joined to their records of one category.
pub async fn get_summary(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<Value>, ApiError> {
    admin_only(&claims)?;

    let category = SummaryCategory::from_str(&query.category)
        .ok_or_else(|| ApiError::Validation(format!("Unknown category: {}", query.category)))?;

    let summary = users_summary(
        category,
        &state.users,
        &state.records,
        &state.reports,
        &state.tickets,
        &state.semesters,
        &state.universities,
    )?;

    Ok(Json(summary))
}
