use std::time::Duration;

use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{
    config::DatabaseConfig,
    error::{AppError, Result},
};

/// Opens the pool and brings the schema up to date before any request is served.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(&config.url)
        .await?;

    let migrator = sqlx::migrate!();
    migrator.run(&pool).await?;

    tracing::info!(
        max_connections = config.max_connections,
        acquire_timeout_secs = config.acquire_timeout_secs,
        migrations = migrator.iter().count(),
        "postgres storage ready"
    );

    Ok(pool)
}

pub async fn check_health(pool: &PgPool) -> Result<()> {
    let one: i32 = sqlx::query_scalar("SELECT 1").fetch_one(pool).await?;
    if one != 1 {
        return Err(AppError::InternalError(format!(
            "Unexpected health query result: {}",
            one
        )));
    }
    Ok(())
}
