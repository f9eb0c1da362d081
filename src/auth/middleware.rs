//! Authentication Middleware
//! Mission: Protect API endpoints with JWT validation and role gating

use crate::auth::{
    jwt::JwtHandler,
    models::{Claims, Role},
};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Auth middleware that validates bearer tokens and stashes the claims in
/// request extensions for handlers.
pub async fn auth_middleware(
    State(jwt_handler): State<Arc<JwtHandler>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|t| t.to_string())
        .ok_or(AuthError::MissingToken)?;

    let claims = jwt_handler
        .validate_token(&token)
        .map_err(|_| AuthError::InvalidToken)?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Role gate for admin-only operations.
pub fn require_admin(claims: &Claims) -> Result<(), AuthError> {
    match claims.role {
        Role::Admin => Ok(()),
        Role::User | Role::Employee | Role::InstituteStudent | Role::ScholarshipStudent => {
            Err(AuthError::NotAdmin)
        }
    }
}

/// Auth error types
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    NotAdmin,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing authorization token"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
            AuthError::NotAdmin => (StatusCode::FORBIDDEN, "Access denied: Not an admin"),
        };

        let body = axum::Json(serde_json::json!({ "message": message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn claims_with_role(role: Role) -> Claims {
        Claims {
            sub: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role,
            exp: 4102444800, // far future
        }
    }

    #[test]
    fn test_auth_error_responses() {
        let missing = AuthError::MissingToken.into_response();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let invalid = AuthError::InvalidToken.into_response();
        assert_eq!(invalid.status(), StatusCode::UNAUTHORIZED);

        let forbidden = AuthError::NotAdmin.into_response();
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_require_admin() {
        assert!(require_admin(&claims_with_role(Role::Admin)).is_ok());
        assert!(require_admin(&claims_with_role(Role::User)).is_err());
        assert!(require_admin(&claims_with_role(Role::Employee)).is_err());
        assert!(require_admin(&claims_with_role(Role::ScholarshipStudent)).is_err());
    }
}
