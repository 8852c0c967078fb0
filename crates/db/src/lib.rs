//! PostgreSQL persistence for the screening engine.
//!
//! Repositories are zero-sized structs whose associated functions take a
//! `&PgPool`. [`store::PgScreeningStore`] adapts them to the collaborator
//! traits the core service depends on.

use esgscreen_core::error::CoreError;
use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;
pub mod store;

pub use store::PgScreeningStore;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Run a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the embedded migrations in `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Map a storage failure onto the domain error.
///
/// Unique-constraint violations keep the constraint name so callers can tell
/// which key collided. Everything else is an internal error; the HTTP layer
/// logs it and hides the detail from clients.
pub fn storage_error(err: sqlx::Error) -> CoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            let constraint = db_err.constraint().unwrap_or("unknown");
            CoreError::Validation(format!(
                "Duplicate value violates unique constraint: {constraint}"
            ))
        }
        _ => {
            tracing::error!(error = %err, "Database error");
            CoreError::Internal(format!("Database error: {err}"))
        }
    }
}
