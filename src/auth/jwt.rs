//! JWT Token Handler
//! Mission: Generate and validate session and password-reset tokens

use crate::auth::models::{Claims, ResetClaims, User, RESET_PURPOSE};
use anyhow::{bail, Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;
use uuid::Uuid;

/// Reset tokens are short-lived by design.
const RESET_TOKEN_MINUTES: i64 = 15;

/// JWT Handler for token operations
pub struct JwtHandler {
    secret: String,
    expiration_hours: i64,
}

impl JwtHandler {
    /// Create a new JWT handler with secret key and 24-hour session tokens.
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            expiration_hours: 24,
        }
    }

    /// Create a handler with a custom session expiry.
    pub fn with_expiration(secret: String, expiration_hours: i64) -> Self {
        Self {
            secret,
            expiration_hours,
        }
    }

    /// Generate a session token for a user.
    pub fn generate_token(&self, user: &User) -> Result<(String, usize)> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(chrono::Duration::hours(self.expiration_hours))
            .context("Invalid timestamp")?
            .timestamp() as usize;

        let expires_in = (self.expiration_hours * 3600) as usize;

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role,
            exp: expiration,
        };

        debug!(
            "Generating session token for {} ({}), expires in {}h",
            user.email, user.id, self.expiration_hours
        );

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to generate JWT")?;

        Ok((token, expires_in))
    }

    /// Validate a session token and extract its claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .context("Invalid or expired token")?;

        debug!("Validated session token for {}", decoded.claims.email);

        Ok(decoded.claims)
    }

    /// Generate a 15-minute password-reset token bound to a user id.
    pub fn generate_reset_token(&self, user_id: &Uuid) -> Result<String> {
        let expiration = Utc::now()
            .checked_add_signed(chrono::Duration::minutes(RESET_TOKEN_MINUTES))
            .context("Invalid timestamp")?
            .timestamp() as usize;

        let claims = ResetClaims {
            sub: user_id.to_string(),
            purpose: RESET_PURPOSE.to_string(),
            exp: expiration,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to generate reset token")
    }

    /// Validate a password-reset token. Session tokens are rejected because
    /// they carry no `purpose` claim.
    pub fn validate_reset_token(&self, token: &str) -> Result<ResetClaims> {
        let decoded = decode::<ResetClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .context("Invalid or expired reset token")?;

        if decoded.claims.purpose != RESET_PURPOSE {
            bail!("Token is not a password-reset token");
        }

        Ok(decoded.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::Role;

    fn create_test_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            password_hash: "hash".to_string(),
            phone_number: None,
            date_of_birth: None,
            gender: None,
            current_education_level: None,
            linkedin_link: None,
            website: None,
            bio: None,
            role: Role::User,
            image_url: None,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    #[test]
    fn test_jwt_generation_and_validation() {
        let handler = JwtHandler::new("test-secret-key-12345".to_string());
        let user = create_test_user();

        let (token, expires_in) = handler.generate_token(&user).unwrap();
        assert!(!token.is_empty());
        assert_eq!(expires_in, 24 * 3600);

        let claims = handler.validate_token(&token).unwrap();
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.role, user.role);
    }

    #[test]
    fn test_invalid_token_rejected() {
        let handler = JwtHandler::new("test-secret-key-12345".to_string());

        let result = handler.validate_token("invalid.token.here");
        assert!(result.is_err());
    }

    #[test]
    fn test_different_secrets_reject() {
        let handler1 = JwtHandler::new("secret1".to_string());
        let handler2 = JwtHandler::new("secret2".to_string());
        let user = create_test_user();

        let (token, _) = handler1.generate_token(&user).unwrap();

        let result = handler2.validate_token(&token);
        assert!(result.is_err());
    }

    #[test]
    fn test_token_embeds_role() {
        let handler = JwtHandler::new("test-secret-key-12345".to_string());
        let mut user = create_test_user();
        user.role = Role::Admin;

        let (token, _) = handler.generate_token(&user).unwrap();
        let claims = handler.validate_token(&token).unwrap();

        assert_eq!(claims.role, Role::Admin);
        assert!(claims.exp > Utc::now().timestamp() as usize);
    }

    #[test]
    fn test_reset_token_round_trip() {
        let handler = JwtHandler::new("test-secret-key-12345".to_string());
        let user_id = Uuid::new_v4();

        let token = handler.generate_reset_token(&user_id).unwrap();
        let claims = handler.validate_reset_token(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.purpose, RESET_PURPOSE);
    }

    #[test]
    fn test_session_token_rejected_as_reset_token() {
        let handler = JwtHandler::new("test-secret-key-12345".to_string());
        let user = create_test_user();

        let (session_token, _) = handler.generate_token(&user).unwrap();
        assert!(handler.validate_reset_token(&session_token).is_err());
    }

    #[test]
    fn test_reset_token_rejected_as_session_token() {
        let handler = JwtHandler::new("test-secret-key-12345".to_string());
        let user_id = Uuid::new_v4();

        let reset_token = handler.generate_reset_token(&user_id).unwrap();
        assert!(handler.validate_token(&reset_token).is_err());
    }
}
