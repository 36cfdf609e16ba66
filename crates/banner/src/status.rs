//! Derives normalized availability from a raw platform record.

use seatwatch_core::SectionStatus;

use crate::records::SectionRecord;

/// Map one raw section record to a [`SectionStatus`]. Pure; absent fields
/// degrade to safe defaults.
///
/// - `seats_available`: the record's seat count if present, else 0.
/// - `is_open`: the open flag must be explicitly true, and a present seat
///   count must be positive. A missing flag means closed; a missing seat
///   count does not block openness.
/// - `waitlist_open`: any one positive signal suffices — the explicit
///   flag, a positive waitlist count, or a positive waitlist capacity.
///   Deployments disagree on which fields they populate, so requiring
///   them to agree would produce false negatives.
pub fn evaluate(record: &SectionRecord) -> SectionStatus {
    let seats_available = record.seats_available.map_or(0, |s| s.max(0)) as u32;

    let is_open =
        record.open_section == Some(true) && record.seats_available.map_or(true, |s| s > 0);

    let waitlist_open = record.waitlist_available == Some(true)
        || record.wait_count.unwrap_or(0) > 0
        || record.wait_capacity.unwrap_or(0) > 0;

    SectionStatus {
        seats_available,
        waitlist_open,
        is_open,
    }
}
