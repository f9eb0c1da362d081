//! Auth Endpoints
//! Mission: Signup, login, and the password-reset flow

use crate::api::error::ApiError;
use crate::api::routes::AppState;
use crate::auth::models::{
    password_meets_policy, LoginRequest, LoginResponse, SessionUser, SignupRequest,
};
use crate::auth::Role;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let name = req.name.trim();
    let email = req.email.trim().to_lowercase();

    if name.is_empty() || email.is_empty() {
        return Err(ApiError::Validation("Name and email are required".into()));
    }
    if !email.contains('@') {
        return Err(ApiError::Validation("Invalid email address".into()));
    }
    if !password_meets_policy(&req.password) {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters and include a number and a symbol".into(),
        ));
    }

    if state.users.get_by_email(&email)?.is_some() {
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let user = state.users.create(name, &email, &req.password, Role::User)?;
    info!("✅ New signup: {} ({})", user.email, user.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully", "id": user.id })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = req.email.trim().to_lowercase();

    let user = state
        .users
        .get_by_email(&email)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    if !state.users.verify_password(&user.email, &req.password)? {
        warn!("Failed login attempt for {}", email);
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    }

    let (token, expires_in) = state.jwt.generate_token(&user)?;
    info!("✅ Login: {} ({})", user.email, user.role.as_str());

    Ok(Json(LoginResponse {
        token,
        expires_in,
        user: SessionUser {
            id: user.id.to_string(),
            email: user.email,
            role: user.role,
        },
    }))
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    let email = req.email.trim().to_lowercase();

    let user = state
        .users
        .get_by_email(&email)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let token = state.jwt.generate_reset_token(&user.id)?;
    let reset_link = format!("{}/{}", state.reset_link_base, token);

    state
        .mailer
        .send_password_reset(&user.email, &reset_link)
        .await?;

    info!("📧 Password reset email sent to {}", user.email);

    Ok(Json(json!({ "message": "Password reset email sent" })))
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: String,
}

pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    let claims = state
        .jwt
        .validate_reset_token(&token)
        .map_err(|_| ApiError::Unauthorized("Invalid or expired reset token".into()))?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| ApiError::Unauthorized("Invalid or expired reset token".into()))?;

    let user = state
        .users
        .get_by_id(&user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    if !password_meets_policy(&req.password) {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters and include a number and a symbol".into(),
        ));
    }

    state.users.update_password(&user.id, &req.password)?;
    info!("✅ Password reset for {}", user.email);

    Ok(Json(json!({ "message": "Password updated successfully" })))
}
