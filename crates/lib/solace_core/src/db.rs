//! SQLite database access.
//!
//! Opens the single-file embedded database behind an `sqlx` pool. The file is
//! created on first use; concurrent readers and writers are coordinated by
//! SQLite itself (WAL journal plus a busy timeout).

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use thiserror::Error;
use tracing::debug;

/// Default database URL, relative to the working directory.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://entries.db";

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Maximum time to wait for a pooled connection.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur while opening or preparing the database.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DbError>;

/// Connection settings for the entry database.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite URL, e.g. `sqlite://entries.db` or `sqlite::memory:`.
    pub url: String,
    /// Maximum number of pooled connections.
    pub max_connections: u32,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: 5,
        }
    }
}

/// Open a pool against the configured database, creating the file if missing.
///
/// In-memory databases are private to a single connection, so the pool is
/// clamped to one connection that is never recycled.
pub async fn connect(config: &DbConfig) -> Result<SqlitePool> {
    let in_memory = config.url.contains(":memory:");
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .busy_timeout(BUSY_TIMEOUT);
    let options = if in_memory {
        options
    } else {
        options.journal_mode(SqliteJournalMode::Wal)
    };

    let mut pool_options = SqlitePoolOptions::new().acquire_timeout(ACQUIRE_TIMEOUT);
    pool_options = if in_memory {
        pool_options
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
    } else {
        pool_options.max_connections(config.max_connections)
    };

    debug!(url = %config.url, in_memory, "opening sqlite pool");
    Ok(pool_options.connect_with(options).await?)
}

/// Open the database and apply embedded migrations.
pub async fn connect_and_migrate(config: &DbConfig) -> Result<SqlitePool> {
    let pool = connect(config).await?;
    crate::migrate::migrate(&pool).await?;
    Ok(pool)
}

/// A migrated database in a temporary directory, removed on drop.
///
/// Used by tests that need a real file (and therefore more than one
/// connection) rather than `sqlite::memory:`.
pub struct EphemeralDb {
    pool: SqlitePool,
    _tempdir: tempfile::TempDir,
}

impl EphemeralDb {
    /// Creates and migrates a fresh database file.
    pub async fn new() -> Result<Self> {
        let tempdir = tempfile::tempdir()?;
        let path = tempdir.path().join("entries.db");
        let config = DbConfig {
            url: format!("sqlite://{}", path.display()),
            max_connections: 5,
        };
        let pool = connect_and_migrate(&config).await?;
        Ok(Self {
            pool,
            _tempdir: tempdir,
        })
    }

    /// Returns a handle to the pool.
    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }
}
