// src/services/verification.rs
//! License authenticity verification.
//!
//! One call classifies a scanned license as `real`, `fake` or `expired`
//! and appends exactly one audit record before returning. "Not found"
//! and "QR mismatch" are successful outcomes, not errors; only
//! persistence faults propagate to the caller.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::debug;

use crate::error::StorageError;
use crate::models::verification::{VerificationLog, VerificationResult, VerificationStatus};
use crate::storage::driver_repository::DriverRepository;
use crate::storage::verification_log_repository::VerificationLogRepository;

/// Service classifying scanned licenses against the central registry.
pub struct VerificationService {
    /// License record lookup
    driver_repository: Arc<DriverRepository>,

    /// Append-only audit sink
    verification_log_repository: Arc<VerificationLogRepository>,
}

impl VerificationService {
    /// Creates a new VerificationService instance.
    ///
    /// # Arguments
    /// * `driver_repository` - Shared license record repository
    /// * `verification_log_repository` - Shared audit trail repository
    pub fn new(
        driver_repository: Arc<DriverRepository>,
        verification_log_repository: Arc<VerificationLogRepository>,
    ) -> Self {
        VerificationService {
            driver_repository,
            verification_log_repository,
        }
    }

    /// Verifies one scanned license.
    ///
    /// Evaluated in this exact order:
    /// 1. Registry lookup by license id; an unknown id classifies as
    ///    `fake` with no holder details.
    /// 2. QR authenticity check: both payloads trimmed, compared
    ///    case-insensitively. A mismatch classifies as `fake` with holder
    ///    details populated. When either payload is empty the check is
    ///    skipped entirely; see `qr_data_matches` below.
    /// 3. Expiry classification, date-only against the current UTC day:
    ///    before today is `expired`, today or later is `real`.
    ///
    /// Whatever branch decides, exactly one audit record with the final
    /// status is written before this function returns, carrying the same
    /// `checked_date` instant as the returned result.
    ///
    /// # Errors
    /// Only persistence faults. Every business outcome, including an
    /// unknown license id, is an `Ok` result.
    pub async fn verify_license(
        &self,
        license_id: &str,
        scanned_qr: &str,
        checked_by: i64,
    ) -> Result<VerificationResult, StorageError> {
        // Captured once; shared by the audit record and the result.
        let checked_date = Utc::now();

        let Some(driver) = self.driver_repository.get_by_license_id(license_id).await? else {
            debug!("license {license_id} not found in registry");
            return self
                .conclude(license_id, VerificationStatus::Fake, None, None, checked_by, checked_date)
                .await;
        };

        let stored_qr = driver.qr_raw_data.as_deref().unwrap_or("");
        if !scanned_qr.is_empty()
            && !stored_qr.is_empty()
            && !Self::qr_data_matches(scanned_qr, stored_qr)
        {
            debug!("license {license_id}: scanned QR payload does not match stored payload");
            return self
                .conclude(
                    license_id,
                    VerificationStatus::Fake,
                    Some(driver.full_name),
                    Some(driver.expiry_date),
                    checked_by,
                    checked_date,
                )
                .await;
        }

        let status = if driver.expiry_date < checked_date.date_naive() {
            VerificationStatus::Expired
        } else {
            VerificationStatus::Real
        };

        self.conclude(
            license_id,
            status,
            Some(driver.full_name),
            Some(driver.expiry_date),
            checked_by,
            checked_date,
        )
        .await
    }

    /// Audit history for one license id, newest first.
    pub async fn verification_history(
        &self,
        license_id: &str,
    ) -> Result<Vec<VerificationLog>, StorageError> {
        self.verification_log_repository
            .get_by_license_id(license_id)
            .await
    }

    /// Writes the audit record for a finished check, then builds the
    /// result. The audit insert is awaited here, so the event is durable
    /// before the caller sees the outcome.
    async fn conclude(
        &self,
        license_id: &str,
        status: VerificationStatus,
        driver_name: Option<String>,
        expiry_date: Option<chrono::NaiveDate>,
        checked_by: i64,
        checked_date: DateTime<Utc>,
    ) -> Result<VerificationResult, StorageError> {
        self.verification_log_repository
            .append(license_id, status, checked_by, checked_date)
            .await?;

        Ok(VerificationResult {
            license_id: license_id.to_string(),
            status,
            driver_name,
            expiry_date,
            checked_date,
        })
    }

    /// Compares a scanned QR payload against the stored one: both sides
    /// trimmed of surrounding whitespace, compared case-insensitively.
    ///
    /// Callers skip this check when either payload is empty, so a record
    /// registered without QR data always passes authenticity and is
    /// classified by expiry alone. That lenience is intentional, kept
    /// from the source behavior; whether such records should instead be
    /// flagged is an open product decision.
    fn qr_data_matches(scanned_qr: &str, stored_qr: &str) -> bool {
        scanned_qr.trim().eq_ignore_ascii_case(stored_qr.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::driver::NewDriver;
    use crate::storage;
    use chrono::{Duration, NaiveDate};

    struct Fixture {
        service: VerificationService,
        drivers: Arc<DriverRepository>,
        logs: Arc<VerificationLogRepository>,
    }

    async fn setup() -> Fixture {
        let pool = storage::test_pool().await;
        let drivers = Arc::new(DriverRepository::new(pool.clone()));
        let logs = Arc::new(VerificationLogRepository::new(pool));
        let service = VerificationService::new(drivers.clone(), logs.clone());
        Fixture {
            service,
            drivers,
            logs,
        }
    }

    fn future_date() -> NaiveDate {
        (Utc::now() + Duration::days(365)).date_naive()
    }

    fn yesterday() -> NaiveDate {
        (Utc::now() - Duration::days(1)).date_naive()
    }

    async fn register(
        fixture: &Fixture,
        license_id: &str,
        qr: Option<&str>,
        expiry: NaiveDate,
    ) {
        fixture
            .drivers
            .create(
                NewDriver {
                    license_id: license_id.to_string(),
                    full_name: "Jane Driver".to_string(),
                    date_of_birth: NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
                    license_type: "B".to_string(),
                    expiry_date: expiry,
                    qr_raw_data: qr.map(str::to_string),
                    ocr_raw_text: None,
                },
                1,
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unknown_license_is_fake_and_audited_once() {
        let fixture = setup().await;

        let result = fixture
            .service
            .verify_license("UNKNOWN123", "whatever", 1)
            .await
            .unwrap();

        assert_eq!(result.status, VerificationStatus::Fake);
        assert!(result.driver_name.is_none());
        assert!(result.expiry_date.is_none());

        let logs = fixture.logs.get_by_license_id("UNKNOWN123").await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, VerificationStatus::Fake);
    }

    #[tokio::test]
    async fn test_qr_match_ignores_whitespace_and_case() {
        let fixture = setup().await;
        register(&fixture, "DL-1001", Some("ABC-123"), future_date()).await;

        let result = fixture
            .service
            .verify_license("DL-1001", " abc-123 ", 1)
            .await
            .unwrap();

        assert_eq!(result.status, VerificationStatus::Real);
        assert_eq!(result.driver_name.as_deref(), Some("Jane Driver"));
    }

    #[tokio::test]
    async fn test_qr_mismatch_is_fake_with_holder_details() {
        let fixture = setup().await;
        register(&fixture, "DL-1002", Some("ABC-123"), future_date()).await;

        let result = fixture
            .service
            .verify_license("DL-1002", "XYZ-999", 1)
            .await
            .unwrap();

        assert_eq!(result.status, VerificationStatus::Fake);
        assert_eq!(result.driver_name.as_deref(), Some("Jane Driver"));
        assert!(result.expiry_date.is_some());
    }

    #[tokio::test]
    async fn test_matching_qr_with_past_expiry_is_expired() {
        let fixture = setup().await;
        register(&fixture, "DL-1003", Some("ABC-123"), yesterday()).await;

        let result = fixture
            .service
            .verify_license("DL-1003", "ABC-123", 1)
            .await
            .unwrap();

        assert_eq!(result.status, VerificationStatus::Expired);
    }

    #[tokio::test]
    async fn test_expiring_today_is_still_real() {
        let fixture = setup().await;
        register(&fixture, "DL-1004", Some("ABC-123"), Utc::now().date_naive()).await;

        let result = fixture
            .service
            .verify_license("DL-1004", "ABC-123", 1)
            .await
            .unwrap();

        assert_eq!(result.status, VerificationStatus::Real);
    }

    #[tokio::test]
    async fn test_missing_stored_qr_skips_authenticity_check() {
        let fixture = setup().await;
        register(&fixture, "DL-1005", None, future_date()).await;

        // No stored payload to compare against: the scan passes
        // authenticity and is classified by expiry alone.
        let result = fixture
            .service
            .verify_license("DL-1005", "ANY-QR-AT-ALL", 1)
            .await
            .unwrap();

        assert_eq!(result.status, VerificationStatus::Real);
    }

    #[tokio::test]
    async fn test_whitespace_only_scan_against_stored_qr_is_fake() {
        let fixture = setup().await;
        register(&fixture, "DL-1006", Some("ABC-123"), future_date()).await;

        // Non-empty but blank after trimming: the check runs and fails.
        let result = fixture
            .service
            .verify_license("DL-1006", "   ", 1)
            .await
            .unwrap();

        assert_eq!(result.status, VerificationStatus::Fake);
    }

    #[tokio::test]
    async fn test_each_call_appends_exactly_one_audit_row() {
        let fixture = setup().await;
        register(&fixture, "DL-1007", Some("ABC-123"), future_date()).await;

        fixture.service.verify_license("DL-1007", "ABC-123", 1).await.unwrap();
        fixture.service.verify_license("DL-1007", "XYZ-999", 2).await.unwrap();
        fixture.service.verify_license("DL-1007", "ABC-123", 1).await.unwrap();

        let logs = fixture.logs.get_by_license_id("DL-1007").await.unwrap();
        assert_eq!(logs.len(), 3);
    }

    #[tokio::test]
    async fn test_audit_record_carries_result_timestamp() {
        let fixture = setup().await;
        register(&fixture, "DL-1008", Some("ABC-123"), future_date()).await;

        let result = fixture
            .service
            .verify_license("DL-1008", "ABC-123", 9)
            .await
            .unwrap();

        let logs = fixture.logs.get_by_license_id("DL-1008").await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].checked_date, result.checked_date);
        assert_eq!(logs[0].checked_by, 9);
        assert_eq!(logs[0].status, result.status);
    }
}
