use anyhow::Context;
use serde_json::json;

use crate::cli::output::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::postgres::apply_schema;
use crate::database::connect;

pub async fn init(output_format: &OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    let url = config.database.url.as_deref().context("DATABASE_URL must be set for init-db")?;

    let pool = connect(url, &config.database).await.context("failed to connect to database")?;
    let statements = apply_schema(&pool).await.context("failed to apply schema")?;

    output_success(output_format, "Database schema applied", Some(json!({ "statements": statements })))
}
