// src/models/driver.rs
//! Driver license record data model.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// A registered driver license record.
///
/// Created once by the registration flow and read-only to the
/// verification engine afterwards. The `license_id` is the natural key:
/// it is the identifier printed and QR-encoded on the physical card, and
/// the storage layer enforces its uniqueness.
#[derive(Debug, Clone, FromRow)]
pub struct Driver {
    /// Database identifier.
    pub driver_id: i64,

    /// External license identifier, globally unique.
    pub license_id: String,

    /// License holder's full name.
    pub full_name: String,

    /// Date of birth as printed on the card.
    pub date_of_birth: NaiveDate,

    /// License class, e.g. "B" or "CE".
    pub license_type: String,

    /// Validity end date. Compared date-only against the current UTC day.
    pub expiry_date: NaiveDate,

    /// QR payload captured at registration time. Absent when the card was
    /// registered without a QR scan.
    pub qr_raw_data: Option<String>,

    /// OCR text captured at registration time.
    pub ocr_raw_text: Option<String>,

    /// When this record was registered.
    pub created_date: DateTime<Utc>,

    /// Account id of the registering operator.
    pub registered_by: i64,
}

/// Fields supplied by the registration flow; the remaining `Driver`
/// columns are filled in by the repository on insert.
#[derive(Debug, Clone)]
pub struct NewDriver {
    pub license_id: String,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub license_type: String,
    pub expiry_date: NaiveDate,
    pub qr_raw_data: Option<String>,
    pub ocr_raw_text: Option<String>,
}
