//! Outbound Mail Collaborator
//! Mission: Deliver password-reset links without owning an SMTP stack

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

/// Seam for the external mail delivery service. Delivery failures are
/// reported to the caller, never retried.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_password_reset(&self, to: &str, reset_link: &str) -> Result<()>;
}

/// Mailer backed by an HTTP mail API (Resend-style JSON endpoint).
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    from: String,
}

impl HttpMailer {
    pub fn new(client: reqwest::Client, api_url: String, from: String) -> Self {
        Self {
            client,
            api_url,
            from,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send_password_reset(&self, to: &str, reset_link: &str) -> Result<()> {
        let body = json!({
            "from": self.from,
            "to": to,
            "subject": "Reset Password",
            "html": format!(
                "<h1>Reset Your Password</h1>\
                 <p>Click on the following link to reset your password:</p>\
                 <a href=\"{reset_link}\">Press Here to reset Password</a>\
                 <p>The link will expire in 15 minutes.</p>\
                 <p>If you didn't request a password reset, please ignore this email.</p>"
            ),
        });

        let resp = self
            .client
            .post(&self.api_url)
            .json(&body)
            .send()
            .await
            .context("Failed to reach mail API")?;

        if !resp.status().is_success() {
            bail!("Mail API rejected the message: {}", resp.status());
        }

        info!("📧 Password reset email dispatched to {}", to);
        Ok(())
    }
}

/// Fallback mailer for deployments without a configured mail API.
/// Logs the link instead of delivering it.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_password_reset(&self, to: &str, reset_link: &str) -> Result<()> {
        warn!(
            "MAIL_API_URL not configured; reset link for {} logged only: {}",
            to, reset_link
        );
        Ok(())
    }
}
