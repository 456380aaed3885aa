// src/storage/driver_repository.rs
//! License record persistence.

use chrono::Utc;
use sqlx::error::ErrorKind;
use sqlx::SqlitePool;

use crate::error::StorageError;
use crate::models::driver::{Driver, NewDriver};

const DRIVER_COLUMNS: &str = "driver_id, license_id, full_name, date_of_birth, license_type,
     expiry_date, qr_raw_data, ocr_raw_text, created_date, registered_by";

/// Read/create access to the `drivers` table.
///
/// License records are never updated or deleted after registration; the
/// verification engine reads them only.
pub struct DriverRepository {
    pool: SqlitePool,
}

impl DriverRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DriverRepository { pool }
    }

    /// Fetches a license record by its external license id.
    pub async fn get_by_license_id(&self, license_id: &str) -> Result<Option<Driver>, StorageError> {
        let driver = sqlx::query_as::<_, Driver>(&format!(
            "SELECT {DRIVER_COLUMNS} FROM drivers WHERE license_id = ?"
        ))
        .bind(license_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(driver)
    }

    /// All license records, most recently registered first. Records
    /// created within the same instant are ordered by insertion id so
    /// the listing stays stable.
    pub async fn get_all(&self) -> Result<Vec<Driver>, StorageError> {
        let drivers = sqlx::query_as::<_, Driver>(&format!(
            "SELECT {DRIVER_COLUMNS} FROM drivers
             ORDER BY created_date DESC, driver_id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(drivers)
    }

    /// Fast-path existence probe.
    ///
    /// Only an optimization for friendlier conflict responses: the
    /// `UNIQUE` constraint on `license_id` remains the actual enforcement
    /// and `create` reports the losing insert of a race as
    /// `DuplicateLicense`.
    pub async fn exists_by_license_id(&self, license_id: &str) -> Result<bool, StorageError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM drivers WHERE license_id = ?")
                .bind(license_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count > 0)
    }

    /// Inserts a new license record and returns it with its assigned id.
    ///
    /// # Errors
    /// `StorageError::DuplicateLicense` when a record with the same
    /// license id already exists (unique-constraint violation), any other
    /// database fault as `StorageError::Database`.
    pub async fn create(
        &self,
        new_driver: NewDriver,
        registered_by: i64,
    ) -> Result<Driver, StorageError> {
        let created_date = Utc::now();

        let result = sqlx::query(
            "INSERT INTO drivers (license_id, full_name, date_of_birth, license_type,
                 expiry_date, qr_raw_data, ocr_raw_text, created_date, registered_by)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&new_driver.license_id)
        .bind(&new_driver.full_name)
        .bind(new_driver.date_of_birth)
        .bind(&new_driver.license_type)
        .bind(new_driver.expiry_date)
        .bind(&new_driver.qr_raw_data)
        .bind(&new_driver.ocr_raw_text)
        .bind(created_date)
        .bind(registered_by)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.kind() == ErrorKind::UniqueViolation => {
                StorageError::DuplicateLicense
            }
            _ => StorageError::Database(e),
        })?;

        Ok(Driver {
            driver_id: result.last_insert_rowid(),
            license_id: new_driver.license_id,
            full_name: new_driver.full_name,
            date_of_birth: new_driver.date_of_birth,
            license_type: new_driver.license_type,
            expiry_date: new_driver.expiry_date,
            qr_raw_data: new_driver.qr_raw_data,
            ocr_raw_text: new_driver.ocr_raw_text,
            created_date,
            registered_by,
        })
    }
}
