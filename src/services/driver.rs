// src/services/driver.rs
//! License record registration and lookup.

use std::sync::Arc;

use log::{info, warn};

use crate::error::StorageError;
use crate::models::driver::{Driver, NewDriver};
use crate::storage::driver_repository::DriverRepository;

/// Service for registering and reading license records.
pub struct DriverService {
    driver_repository: Arc<DriverRepository>,
}

impl DriverService {
    /// Creates a new DriverService instance.
    ///
    /// # Arguments
    /// * `driver_repository` - Shared license record repository
    pub fn new(driver_repository: Arc<DriverRepository>) -> Self {
        DriverService { driver_repository }
    }

    /// Registers a new license record on behalf of an authenticated
    /// operator.
    ///
    /// The existence probe in front of the insert only makes the common
    /// duplicate case cheap; two concurrent registrations of the same
    /// license id can both pass it. Correctness comes from the storage
    /// layer's unique constraint, which turns the losing insert into
    /// `StorageError::DuplicateLicense`.
    ///
    /// # Errors
    /// `StorageError::DuplicateLicense` when the license id is already
    /// registered, `StorageError::Database` for infrastructure faults.
    pub async fn register_driver(
        &self,
        new_driver: NewDriver,
        registered_by: i64,
    ) -> Result<Driver, StorageError> {
        if self
            .driver_repository
            .exists_by_license_id(&new_driver.license_id)
            .await?
        {
            warn!(
                "duplicate registration attempt for license {}",
                new_driver.license_id
            );
            return Err(StorageError::DuplicateLicense);
        }

        let driver = self
            .driver_repository
            .create(new_driver, registered_by)
            .await?;

        info!(
            "registered license {} (driver id {}) by account {}",
            driver.license_id, driver.driver_id, registered_by
        );
        Ok(driver)
    }

    /// Fetches a license record by its external license id.
    pub async fn get_driver_by_license_id(
        &self,
        license_id: &str,
    ) -> Result<Option<Driver>, StorageError> {
        self.driver_repository.get_by_license_id(license_id).await
    }

    /// All registered license records, most recently created first.
    pub async fn get_all_drivers(&self) -> Result<Vec<Driver>, StorageError> {
        self.driver_repository.get_all().await
    }
}
