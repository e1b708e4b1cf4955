pub mod error;
pub mod genre;
pub mod movie;
pub mod movie_genre;

use std::str::FromStr as _;

pub use error::Error;
pub use sqlx::Error as SqlxError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tracing::debug;

use crate::error::Result;

pub type ChosenDB = sqlx::Sqlite;
pub type ChosenConnection = sqlx::SqliteConnection;
pub type ChosenRow = sqlx::sqlite::SqliteRow;
pub type Pool = sqlx::Pool<ChosenDB>;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 16;

/// Opens pool for given database URL, database file is created if it does not exist.
pub async fn new_pool(database_url: &str) -> Result<Pool> {
    new_pool_with(database_url, DEFAULT_MAX_CONNECTIONS).await
}

pub async fn new_pool_with(database_url: &str, max_connections: u32) -> Result<Pool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;
    debug!("Opened database pool for {database_url}");
    Ok(pool)
}

/// Single connection in-memory database with schema applied, each call gives fresh database.
pub async fn new_memory_pool() -> Result<Pool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true))
        .await?;
    migrate(&pool).await?;
    Ok(pool)
}

/// Starts transaction holding the write lock from the first statement, so a transaction
/// that reads before writing waits for other writers instead of failing on lock upgrade.
pub async fn begin_write(pool: &Pool) -> Result<sqlx::Transaction<'static, ChosenDB>> {
    let tx = pool.begin_with("BEGIN IMMEDIATE").await?;
    Ok(tx)
}

pub async fn migrate(pool: &Pool) -> Result<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}
