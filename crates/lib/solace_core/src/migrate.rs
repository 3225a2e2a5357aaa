//! Database migration support.
//!
//! Embeds and runs SQL migrations from `solace_core/migrations/`.

use sqlx::SqlitePool;

/// Run all embedded database migrations against the given pool.
///
/// Applied migrations are recorded in `_sqlx_migrations`, so running this
/// against an existing database file is a no-op.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
