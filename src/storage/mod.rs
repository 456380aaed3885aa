// src/storage/mod.rs
//! SQLite persistence layer.
//!
//! Repositories hold a cheap-to-clone connection pool and expose the
//! operations the services need, nothing more. Uniqueness of
//! `drivers.license_id` is enforced here, by the schema, not by
//! application-side checks.

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

pub mod driver_repository;
pub mod user_repository;
pub mod verification_log_repository;

const CREATE_USERS: &str = "CREATE TABLE IF NOT EXISTS users (
    user_id       INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT    NOT NULL UNIQUE,
    password_hash TEXT    NOT NULL,
    created_date  TEXT    NOT NULL
)";

const CREATE_DRIVERS: &str = "CREATE TABLE IF NOT EXISTS drivers (
    driver_id     INTEGER PRIMARY KEY AUTOINCREMENT,
    license_id    TEXT    NOT NULL UNIQUE,
    full_name     TEXT    NOT NULL,
    date_of_birth TEXT    NOT NULL,
    license_type  TEXT    NOT NULL,
    expiry_date   TEXT    NOT NULL,
    qr_raw_data   TEXT,
    ocr_raw_text  TEXT,
    created_date  TEXT    NOT NULL,
    registered_by INTEGER NOT NULL REFERENCES users(user_id)
)";

// Append-only: nothing in the codebase issues UPDATE or DELETE against
// this table.
const CREATE_VERIFICATION_LOGS: &str = "CREATE TABLE IF NOT EXISTS verification_logs (
    log_id       INTEGER PRIMARY KEY AUTOINCREMENT,
    license_id   TEXT    NOT NULL,
    status       TEXT    NOT NULL,
    checked_by   INTEGER NOT NULL REFERENCES users(user_id),
    checked_date TEXT    NOT NULL
)";

/// Opens a connection pool against `database_url`.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
}

/// Creates all tables that do not exist yet.
///
/// Run once at startup, before any repository is used. Safe to call on an
/// already-initialized database.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_USERS).execute(pool).await?;
    sqlx::query(CREATE_DRIVERS).execute(pool).await?;
    sqlx::query(CREATE_VERIFICATION_LOGS).execute(pool).await?;
    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    init_schema(&pool).await.expect("schema init");
    pool
}
