// src/storage/verification_log_repository.rs
//! Append-only audit trail of verification attempts.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::StorageError;
use crate::models::verification::{VerificationLog, VerificationStatus};

/// Append/read access to the `verification_logs` table.
///
/// This type intentionally exposes no update or delete operation: once an
/// authenticity check has been recorded it stays recorded. The insert is
/// awaited by the verification call that produced it, so an event is
/// durable before that call returns.
pub struct VerificationLogRepository {
    pool: SqlitePool,
}

impl VerificationLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        VerificationLogRepository { pool }
    }

    /// Appends one immutable audit record.
    ///
    /// `checked_date` is supplied by the caller so the persisted instant
    /// matches the one returned in the verification result.
    pub async fn append(
        &self,
        license_id: &str,
        status: VerificationStatus,
        checked_by: i64,
        checked_date: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO verification_logs (license_id, status, checked_by, checked_date)
             VALUES (?, ?, ?, ?)",
        )
        .bind(license_id)
        .bind(status)
        .bind(checked_by)
        .bind(checked_date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// All audit records for one license id, newest first. Entries with
    /// the same timestamp are ordered by `log_id`, which also reflects
    /// insertion order.
    pub async fn get_by_license_id(
        &self,
        license_id: &str,
    ) -> Result<Vec<VerificationLog>, StorageError> {
        let logs = sqlx::query_as::<_, VerificationLog>(
            "SELECT log_id, license_id, status, checked_by, checked_date
             FROM verification_logs
             WHERE license_id = ?
             ORDER BY checked_date DESC, log_id DESC",
        )
        .bind(license_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }
}
