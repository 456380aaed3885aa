// src/storage/user_repository.rs
//! Account persistence.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::StorageError;
use crate::models::user::User;

/// Read/create access to the `users` table.
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Looks up an account by its login name.
    ///
    /// The match is case-sensitive: `username` is compared against the
    /// stored value with SQLite's default BINARY collation, no
    /// normalization on either side.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, username, password_hash, created_date
             FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Inserts a new account and returns it with its assigned id.
    pub async fn create(&self, username: &str, password_hash: &str) -> Result<User, StorageError> {
        let created_date = Utc::now();

        let result = sqlx::query(
            "INSERT INTO users (username, password_hash, created_date) VALUES (?, ?, ?)",
        )
        .bind(username)
        .bind(password_hash)
        .bind(created_date)
        .execute(&self.pool)
        .await?;

        Ok(User {
            user_id: result.last_insert_rowid(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_date,
        })
    }

    /// Number of provisioned accounts. Used to decide whether the seed
    /// account should be created at startup.
    pub async fn count(&self) -> Result<i64, StorageError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
