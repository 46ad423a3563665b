//! Migration commands.

use anyhow::Context;
use bartender_db::DbPool;
use chrono::{DateTime, Utc};

use crate::table::Table;

/// Apply every pending migration.
pub async fn run(pool: &DbPool) -> anyhow::Result<()> {
    tracing::info!("Running migrations");
    bartender_db::run_migrations(pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Migrations complete");
    Ok(())
}

/// Print the migrations recorded in the database.
pub async fn status(pool: &DbPool) -> anyhow::Result<()> {
    let rows: Vec<(i64, String, DateTime<Utc>, bool)> = sqlx::query_as(
        "SELECT version, description, installed_on, success \
         FROM _sqlx_migrations ORDER BY version",
    )
    .fetch_all(pool)
    .await
    .context("Failed to read migration history (has `migrate` been run?)")?;

    let mut table = Table::new(["version", "description", "installed_on", "success"]);
    for (version, description, installed_on, success) in &rows {
        table.row([
            version.to_string(),
            description.clone(),
            installed_on.format("%Y-%m-%d %H:%M:%S").to_string(),
            success.to_string(),
        ]);
    }
    print!("{table}");
    println!("{} migration(s) applied", rows.len());
    Ok(())
}
