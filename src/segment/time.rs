//! Timestamp helpers.
//!
//! Ordering uses the raw ISO strings, overlap arithmetic uses parsed instants.
//! The two are kept apart so sorting never goes through a float. Durations are
//! taken as chrono differences before any conversion to seconds, so sub-second
//! spans stay exact at wall-clock magnitudes.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

use super::Segment;

// Producers sometimes drop the offset suffix; those values are UTC.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses an ISO-8601-like timestamp as a UTC instant.
pub fn parse_utc(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

/// Length of a chrono span in seconds, clamped at zero.
fn span_seconds(delta: Duration) -> f64 {
    match delta.num_microseconds() {
        Some(micros) => micros.max(0) as f64 / 1_000_000.0,
        None => delta.num_milliseconds().max(0) as f64 / 1_000.0,
    }
}

/// Sorts segments ascending by their raw start key.
pub fn sort_by_start_key(segments: &mut [Segment]) {
    segments.sort_by(|a, b| a.absolute_start_time.cmp(&b.absolute_start_time));
}

pub fn is_sorted_by_start_key(segments: &[Segment]) -> bool {
    segments
        .windows(2)
        .all(|pair| pair[0].absolute_start_time <= pair[1].absolute_start_time)
}

/// A wall-clock time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn from_timestamps(start: &str, end: &str) -> Option<Self> {
        Some(Self {
            start: parse_utc(start)?,
            end: parse_utc(end)?,
        })
    }

    /// Duration in seconds, zero for inverted ranges.
    pub fn duration(&self) -> f64 {
        span_seconds(self.end - self.start)
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start.max(other.start) < self.end.min(other.end)
    }

    /// Length of the shared range in seconds, zero when disjoint.
    pub fn overlap(&self, other: &Interval) -> f64 {
        span_seconds(self.end.min(other.end) - self.start.max(other.start))
    }

    /// True when `other` lies entirely inside `self` (bounds inclusive).
    pub fn contains(&self, other: &Interval) -> bool {
        other.start >= self.start && other.end <= self.end
    }
}
