//! Shared domain types for tracked course sections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Chat-platform user identifier.
pub type UserId = i64;

/// Availability derived from one platform record during a poll cycle.
///
/// Ephemeral: recomputed every cycle and copied into the stored
/// [`TrackedSection`], never persisted on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionStatus {
    pub seats_available: u32,
    pub waitlist_open: bool,
    /// True iff the section can currently be registered into.
    pub is_open: bool,
}

/// One user's watch on one course section.
///
/// `crn` is the identity key; within a single user's list it is unique.
/// Status fields hold the last observed values and start zeroed until the
/// first successful poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedSection {
    /// Opaque platform term code (e.g. "202510").
    pub term: String,
    /// Subject code, upper-cased on entry.
    pub subject: String,
    /// Course number kept in literal string form; the platform treats it
    /// as text and leading characters must survive.
    pub course_number: String,
    /// Section number, zero-padded to two characters ("2" -> "02") so it
    /// compares exactly against platform sequence numbers.
    pub section: String,
    /// Course reference number; unique per section offering per term.
    pub crn: String,
    pub seats_available: u32,
    pub waitlist_open: bool,
    pub is_open: bool,
    pub added_at: DateTime<Utc>,
}

impl TrackedSection {
    /// Build a new watch with normalized inputs and zeroed status.
    pub fn new(term: &str, subject: &str, course_number: &str, section: &str, crn: &str) -> Self {
        Self {
            term: term.trim().to_string(),
            subject: normalize_subject(subject),
            course_number: course_number.trim().to_string(),
            section: normalize_section_number(section),
            crn: crn.trim().to_string(),
            seats_available: 0,
            waitlist_open: false,
            is_open: false,
            added_at: Utc::now(),
        }
    }

    /// Overwrite the last-observed status fields.
    pub fn apply_status(&mut self, status: SectionStatus) {
        self.seats_available = status.seats_available;
        self.waitlist_open = status.waitlist_open;
        self.is_open = status.is_open;
    }

    /// Current status fields as a [`SectionStatus`].
    pub fn status(&self) -> SectionStatus {
        SectionStatus {
            seats_available: self.seats_available,
            waitlist_open: self.waitlist_open,
            is_open: self.is_open,
        }
    }

    /// Short display label, e.g. "ENGL 214-02".
    pub fn label(&self) -> String {
        format!("{} {}-{}", self.subject, self.course_number, self.section)
    }
}

/// Upper-case a subject code ("engl" -> "ENGL").
pub fn normalize_subject(subject: &str) -> String {
    subject.trim().to_uppercase()
}

/// Zero-pad a section number to two characters ("2" -> "02").
///
/// Values already two or more characters wide pass through unchanged, so
/// platform-provided sequence numbers like "02" compare equal.
pub fn normalize_section_number(section: &str) -> String {
    format!("{:0>2}", section.trim())
}
