//! Authentication Models
//! Mission: Define user, role, and token claim data structures

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User account with profile attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub phone_number: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub current_education_level: Option<String>,
    pub linkedin_link: Option<String>,
    pub website: Option<String>,
    pub bio: Option<String>,
    pub role: Role,
    pub image_url: Option<String>,
    pub created_at: String,
}

/// User roles for access control. Single-valued per user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "User")]
    User,
    #[serde(rename = "Employee")]
    Employee,
    #[serde(rename = "Admin")]
    Admin,
    #[serde(rename = "Institute Student")]
    InstituteStudent,
    #[serde(rename = "Scholarship Student")]
    ScholarshipStudent,
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::User => "User",
            Role::Employee => "Employee",
            Role::Admin => "Admin",
            Role::InstituteStudent => "Institute Student",
            Role::ScholarshipStudent => "Scholarship Student",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "User" => Some(Role::User),
            "Employee" => Some(Role::Employee),
            "Admin" => Some(Role::Admin),
            "Institute Student" => Some(Role::InstituteStudent),
            "Scholarship Student" => Some(Role::ScholarshipStudent),
            _ => None,
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

/// Session token claims payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // subject (user id)
    pub email: String,
    pub role: Role,
    pub exp: usize, // expiration timestamp
}

impl Claims {
    /// Parse the subject back into a user id.
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).context("Malformed subject claim")
    }
}

/// Password-reset token claims. The `purpose` marker keeps session tokens
/// and reset tokens from being interchangeable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetClaims {
    pub sub: String,
    pub purpose: String,
    pub exp: usize,
}

pub const RESET_PURPOSE: &str = "password-reset";

/// Password policy: at least 8 characters, one digit, one symbol.
pub fn password_meets_policy(password: &str) -> bool {
    password.len() >= 8
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| "!@#$%^&*".contains(c))
}

/// Signup request body
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: usize, // seconds until expiration
    pub user: SessionUser,
}

/// The identity embedded in the session token, echoed back on login.
#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub role: Role,
}

/// Partial profile update. Only fields present overwrite existing values.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub current_education_level: Option<String>,
    pub linkedin_link: Option<String>,
    pub website: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
    pub image_url: Option<String>,
}
