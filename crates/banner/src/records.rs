//! Wire types for the registration platform's search response.
//!
//! The platform returns `{ success: bool, data: [record...] }`. Records
//! carry many more fields than we consume; unknown fields are ignored and
//! every consumed field except the reference number is optional, since
//! deployments differ in which ones they populate.

use serde::Deserialize;

use seatwatch_core::normalize_section_number;

/// Top-level search envelope.
///
/// A missing `success` flag deserializes as `false`; callers treat that
/// the same as an explicit platform-reported failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchResponse {
    pub success: bool,
    pub data: Option<Vec<SectionRecord>>,
}

/// One raw section as returned by the platform. Read-only per poll cycle.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SectionRecord {
    /// Course reference number (CRN).
    pub course_reference_number: String,
    /// Section number, e.g. "02".
    pub sequence_number: Option<String>,
    pub seats_available: Option<i64>,
    pub open_section: Option<bool>,
    /// Explicit waitlist availability flag (not all deployments send it).
    pub waitlist_available: Option<bool>,
    pub wait_count: Option<i64>,
    pub wait_capacity: Option<i64>,
}

impl SectionRecord {
    /// Whether this record is the offering a watch refers to: reference
    /// number equals `crn` and the normalized sequence number equals
    /// `section` (itself already normalized at store time).
    pub fn matches_watch(&self, crn: &str, section: &str) -> bool {
        if self.course_reference_number != crn {
            return false;
        }
        match self.sequence_number.as_deref() {
            Some(seq) => normalize_section_number(seq) == section,
            None => false,
        }
    }
}
