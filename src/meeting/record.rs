//! Meeting status and record types.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::segment::Segment;

/// Bot lifecycle status as reported by the transcription backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    Requested,
    Joining,
    AwaitingAdmission,
    Active,
    Stopping,
    Completed,
    Failed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl MeetingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Joining => "joining",
            Self::AwaitingAdmission => "awaiting_admission",
            Self::Active => "active",
            Self::Stopping => "stopping",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }

    /// True once the bot has left the meeting and no more segments will arrive.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// The meeting a transcript belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeetingRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub platform: String,
    pub native_meeting_id: String,
    #[serde(default)]
    pub status: MeetingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

impl MeetingRecord {
    pub fn new(platform: impl Into<String>, native_meeting_id: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            native_meeting_id: native_meeting_id.into(),
            ..Default::default()
        }
    }

    /// Fills an unset start time from the earliest resolved segment.
    ///
    /// Never overwrites a start time that is already present. Returns true when
    /// a value was written.
    pub fn backfill_start_time(&mut self, resolved: &[Segment]) -> bool {
        if self.start_time.as_deref().is_some_and(|t| !t.trim().is_empty()) {
            return false;
        }

        let Some(earliest) = resolved
            .iter()
            .map(|segment| segment.absolute_start_time.as_str())
            .filter(|key| !key.trim().is_empty())
            .min()
        else {
            return false;
        };

        info!(
            "Backfilling start time for {}/{}: {}",
            self.platform, self.native_meeting_id, earliest
        );
        self.start_time = Some(earliest.to_string());
        true
    }
}
