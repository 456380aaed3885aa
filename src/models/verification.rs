// src/models/verification.rs
//! Verification outcome model: status classification, the immutable audit
//! record, and the result handed back to callers.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Outcome of a license authenticity check.
///
/// These three values are the only ones the audit trail may ever contain.
/// Serialized (and persisted) as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum VerificationStatus {
    /// The license is registered, matched its stored QR payload and has
    /// not expired.
    Real,

    /// The license is unknown, or the scanned QR payload does not match
    /// the stored one. A successful business outcome, not an error.
    Fake,

    /// The license is genuine but its validity window has passed.
    Expired,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Real => "real",
            VerificationStatus::Fake => "fake",
            VerificationStatus::Expired => "expired",
        }
    }

    /// The license exists in the registry (it may still be expired).
    pub fn is_real(&self) -> bool {
        *self != VerificationStatus::Fake
    }

    /// The license exists and is currently valid.
    pub fn is_active(&self) -> bool {
        *self == VerificationStatus::Real
    }

    /// Human-readable explanation shown to the scanning client.
    pub fn message(&self) -> &'static str {
        match self {
            VerificationStatus::Real => "This license is valid and active",
            VerificationStatus::Fake => {
                "This license is fake and not found in our central registry"
            }
            VerificationStatus::Expired => "This license has expired",
        }
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable audit record of an authenticity check.
///
/// Rows are append-only: no update, delete or dedup path exists anywhere
/// in the system. When two checks land on the same `checked_date` the
/// autoincrement `log_id` breaks the tie.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VerificationLog {
    pub log_id: i64,

    /// License id as supplied by the caller, recorded even when no such
    /// record exists.
    pub license_id: String,

    pub status: VerificationStatus,

    /// Account id of the checking operator.
    pub checked_by: i64,

    pub checked_date: DateTime<Utc>,
}

/// Result of one verification call.
///
/// `checked_date` is the same instant that was written to the audit
/// trail for this call (captured once, reused).
#[derive(Debug, Clone, Serialize)]
pub struct VerificationResult {
    pub license_id: String,
    pub status: VerificationStatus,

    /// Populated when a record was found, absent for unknown licenses.
    pub driver_name: Option<String>,

    /// Populated when a record was found.
    pub expiry_date: Option<NaiveDate>,

    pub checked_date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&VerificationStatus::Fake).unwrap(),
            "\"fake\""
        );
        assert_eq!(
            serde_json::to_string(&VerificationStatus::Real).unwrap(),
            "\"real\""
        );
        assert_eq!(
            serde_json::to_string(&VerificationStatus::Expired).unwrap(),
            "\"expired\""
        );
    }

    #[test]
    fn test_status_projection() {
        // "expired" still counts as a real card, only "real" is active.
        assert!(VerificationStatus::Real.is_real());
        assert!(VerificationStatus::Expired.is_real());
        assert!(!VerificationStatus::Fake.is_real());

        assert!(VerificationStatus::Real.is_active());
        assert!(!VerificationStatus::Expired.is_active());
        assert!(!VerificationStatus::Fake.is_active());
    }
}
