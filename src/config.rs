//! Runtime Configuration
//! Mission: Parse all server settings from the environment once at startup

use anyhow::{Context, Result};
use std::env;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub database_path: String,
    pub jwt_secret: String,
    pub jwt_expires_hours: i64,
    pub mail_api_url: Option<String>,
    pub mail_from: String,
    pub reset_link_base: String,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// `JWT_SECRET` is required; everything else has a sensible default.
    pub fn from_env() -> Result<Self> {
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let database_path = env::var("DATABASE_PATH").unwrap_or_else(|_| "mawaheb.db".to_string());

        let jwt_expires_hours = env::var("JWT_EXPIRES_HOURS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(24);

        let mail_api_url = env::var("MAIL_API_URL").ok().filter(|v| !v.is_empty());

        let mail_from =
            env::var("MAIL_FROM").unwrap_or_else(|_| "no-reply@mawaheb.app".to_string());

        let reset_link_base = env::var("RESET_LINK_BASE")
            .unwrap_or_else(|_| "https://mawaheb.app/reset-password".to_string());

        Ok(Self {
            bind_addr,
            database_path,
            jwt_secret,
            jwt_expires_hours,
            mail_api_url,
            mail_from,
            reset_link_base,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        // Direct construction mirrors what from_env produces with only the
        // secret set; from_env itself is not exercised here because the test
        // harness shares one process environment.
        let config = Config {
            bind_addr: "0.0.0.0:3000".to_string(),
            database_path: "mawaheb.db".to_string(),
            jwt_secret: "secret".to_string(),
            jwt_expires_hours: 24,
            mail_api_url: None,
            mail_from: "no-reply@mawaheb.app".to_string(),
            reset_link_base: "https://mawaheb.app/reset-password".to_string(),
        };

        assert_eq!(config.jwt_expires_hours, 24);
        assert!(config.mail_api_url.is_none());
    }
}
