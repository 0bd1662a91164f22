//! Database access for persona-svc
//!
//! SQLite via sqlx. The schema is created on startup if missing.

pub mod persons;

use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::time::Duration;

pub use persons::{PersonStore, SqlitePersonStore};

/// Open the connection pool and make sure the schema exists
///
/// `acquire_timeout` bounds how long a query waits for a free connection.
pub async fn init_database_pool(database_url: &str, acquire_timeout: Duration) -> Result<SqlitePool> {
    tracing::debug!("Connecting to database: {}", database_url);

    let mut options = SqlitePoolOptions::new().acquire_timeout(acquire_timeout);

    // Every in-memory connection is its own database; keep exactly one alive
    if database_url.contains(":memory:") {
        options = options
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    let pool = options
        .connect(database_url)
        .await
        .with_context(|| format!("Failed to connect to database {}", database_url))?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create the persons table if it doesn't exist
async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS persons (
            person_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            surname TEXT NOT NULL,
            age INTEGER NOT NULL,
            gender TEXT NOT NULL,
            country TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create persons table")?;

    tracing::info!("Database tables initialized (persons)");

    Ok(())
}
