//! Meeting records owned by a transcript session.
//!
//! Holds the bits of meeting metadata the reconciliation layer touches:
//! identity, bot status, and the session start time backfilled from the
//! earliest resolved segment.

pub mod record;

pub use record::{MeetingRecord, MeetingStatus};
