//! Transcript segment types.
//!
//! A [`Segment`] is one transcribed utterance as the reconciliation core sees
//! it. Records coming off the wire are deserialized through [`RawSegment`],
//! which tolerates both the Vexa API's snake_case keys and the dashboard's
//! camelCase keys and fills in defaults for anything the producer left out.

mod batch;
mod text;
mod time;

pub use batch::SegmentBatch;
pub use text::{clean_text, same_text, word_count};
pub use time::{is_sorted_by_start_key, parse_utc, sort_by_start_key, Interval};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const UNKNOWN_SPEAKER: &str = "Unknown";
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// Why a segment was excluded from the merge map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentRejection {
    #[error("segment has no absolute start time")]
    MissingStartTime,
    #[error("segment at {key} has empty text")]
    EmptyText { key: String },
    #[error("segment start time {value:?} is not a valid UTC timestamp")]
    InvalidTimestamp { value: String },
    #[error("segment record {index} could not be decoded: {reason}")]
    Malformed { index: usize, reason: String },
}

/// A transcribed utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSegment")]
pub struct Segment {
    pub absolute_start_time: String,
    pub absolute_end_time: String,
    pub start_time: f64,
    pub end_time: f64,
    pub text: String,
    pub speaker: String,
    pub language: String,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Segment {
    /// The merge key: the exact absolute start timestamp.
    pub fn key(&self) -> &str {
        &self.absolute_start_time
    }

    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }

    /// Checks the segment is eligible for the merge map.
    pub fn validate(&self) -> Result<(), SegmentRejection> {
        let key = self.absolute_start_time.trim();
        if key.is_empty() {
            return Err(SegmentRejection::MissingStartTime);
        }
        if self.trimmed_text().is_empty() {
            return Err(SegmentRejection::EmptyText {
                key: self.absolute_start_time.clone(),
            });
        }
        if parse_utc(key).is_none() {
            return Err(SegmentRejection::InvalidTimestamp {
                value: self.absolute_start_time.clone(),
            });
        }
        Ok(())
    }

    /// Wall-clock interval, `None` if either bound fails to parse.
    pub fn interval(&self) -> Option<Interval> {
        Interval::from_timestamps(&self.absolute_start_time, &self.absolute_end_time)
    }
}

/// Lenient wire shape of a segment record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSegment {
    #[serde(default, alias = "absoluteStartTime")]
    pub absolute_start_time: Option<String>,
    #[serde(default, alias = "absoluteEndTime")]
    pub absolute_end_time: Option<String>,
    #[serde(default, alias = "start", alias = "startTime")]
    pub start_time: Option<f64>,
    #[serde(default, alias = "end", alias = "endTime")]
    pub end_time: Option<f64>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub speaker: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default, alias = "sessionUid")]
    pub session_uid: Option<String>,
    #[serde(default, alias = "updatedAt")]
    pub updated_at: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<RawSegment> for Segment {
    fn from(raw: RawSegment) -> Self {
        Self {
            absolute_start_time: raw.absolute_start_time.unwrap_or_default(),
            absolute_end_time: raw.absolute_end_time.unwrap_or_default(),
            start_time: raw.start_time.unwrap_or(0.0),
            end_time: raw.end_time.unwrap_or(0.0),
            text: raw.text.unwrap_or_default(),
            speaker: non_blank(raw.speaker).unwrap_or_else(|| UNKNOWN_SPEAKER.to_string()),
            language: non_blank(raw.language).unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string()),
            completed: raw.completed.unwrap_or(false),
            session_uid: non_blank(raw.session_uid),
            updated_at: non_blank(raw.updated_at),
        }
    }
}
