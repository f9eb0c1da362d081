//! Stats Endpoints
//! Mission: Headline counts plus the admin role breakdown

use crate::aggregation::role_statistics;
use crate::api::error::ApiError;
use crate::api::routes::AppState;
use crate::auth::{require_admin, Claims};
use axum::extract::State;
use axum::{Extension, Json};
use chrono::Utc;
use serde_json::{json, Value};

pub async fn general_stats(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let total_users = state.users.count()?;

    Ok(Json(json!({
        "totalUsers": total_users,
        "timestamp": Utc::now().to_rfc3339(),
    })))
}

pub async fn admin_stats(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    require_admin(&claims)
        .map_err(|_| ApiError::Forbidden("Access denied: Not an admin".into()))?;

    let users = state.users.list_all()?;
    let by_role = role_statistics(&users);

    Ok(Json(json!({
        "totalUsers": users.len(),
        "byRole": by_role,
        "timestamp": Utc::now().to_rfc3339(),
    })))
}
