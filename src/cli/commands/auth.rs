use anyhow::Context;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{PasswordHasher, SessionKeys};
use crate::cli::output::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;

pub fn hash_password(password: &str, output_format: &OutputFormat) -> anyhow::Result<()> {
    if password.is_empty() {
        anyhow::bail!("password must not be empty");
    }
    let hash = PasswordHasher::new().hash_password(password)?;
    output_success(output_format, "Password hashed", Some(json!({ "hash": hash })))
}

pub fn issue_token(email: &str, name: &str, id: Option<Uuid>, output_format: &OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    let keys = SessionKeys::from_config(&config.session);
    if !keys.is_configured() {
        anyhow::bail!("SESSION_SECRET must be set to issue tokens");
    }

    let issued = keys
        .issue(id.unwrap_or_else(Uuid::new_v4), &email.trim().to_lowercase(), name)
        .context("failed to issue session token")?;

    output_success(
        output_format,
        "Session token issued",
        Some(json!({
            "token": issued.token,
            "cookie": config.session.cookie_name,
            "expires_at": issued.session.expires_at,
        })),
    )
}
