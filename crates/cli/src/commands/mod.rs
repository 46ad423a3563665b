pub mod migrate;
pub mod query;
pub mod seed;

use anyhow::Context;
use bartender_db::DbPool;

/// Connect to the database named by `DATABASE_URL`.
pub async fn connect() -> anyhow::Result<DbPool> {
    let url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = bartender_db::create_pool(&url)
        .await
        .context("Failed to connect to database")?;
    bartender_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    Ok(pool)
}
