//! Live push-channel feed.
//!
//! Each push message carries at most one segment batch. The feed applies
//! batches to a shared [`TranscriptHandle`] as they arrive and keeps going
//! past bad messages; delivery order and duplicates are handled by the merge.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::meeting::{MeetingRecord, MeetingStatus};
use crate::segment::{Segment, SegmentBatch};
use crate::transcript::TranscriptHandle;

/// Identifies which meeting a push message is about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeetingRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, alias = "native_meeting_id", skip_serializing_if = "Option::is_none")]
    pub native_id: Option<String>,
}

impl MeetingRef {
    /// False only when both sides name a meeting and the names differ.
    pub fn matches(&self, meeting: &MeetingRecord) -> bool {
        let same = |theirs: &Option<String>, ours: &str| match theirs.as_deref() {
            Some(theirs) if !theirs.is_empty() && !ours.is_empty() => theirs == ours,
            _ => true,
        };
        same(&self.platform, &meeting.platform) && same(&self.native_id, &meeting.native_meeting_id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentPayload {
    /// Decoded record by record; one bad record doesn't sink the batch.
    #[serde(default)]
    pub segments: SegmentBatch,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusPayload {
    #[serde(default)]
    pub status: MeetingStatus,
}

/// A message from the push channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LiveMessage {
    #[serde(rename = "transcript.mutable")]
    TranscriptMutable {
        #[serde(default)]
        meeting: Option<MeetingRef>,
        #[serde(default)]
        payload: SegmentPayload,
    },
    #[serde(rename = "transcript.finalized")]
    TranscriptFinalized {
        #[serde(default)]
        meeting: Option<MeetingRef>,
        #[serde(default)]
        payload: SegmentPayload,
    },
    #[serde(rename = "meeting.status")]
    MeetingStatus {
        #[serde(default)]
        meeting: Option<MeetingRef>,
        #[serde(default)]
        payload: StatusPayload,
    },
    #[serde(rename = "subscribed")]
    Subscribed,
    #[serde(rename = "pong")]
    Pong,
    #[serde(rename = "error")]
    Error {
        #[serde(default)]
        error: String,
    },
    #[serde(other)]
    Other,
}

impl LiveMessage {
    pub fn transcript(meeting: Option<MeetingRef>, segments: Vec<Segment>) -> Self {
        Self::TranscriptMutable {
            meeting,
            payload: SegmentPayload {
                segments: segments.into(),
            },
        }
    }

    fn meeting_ref(&self) -> Option<&MeetingRef> {
        match self {
            Self::TranscriptMutable { meeting, .. }
            | Self::TranscriptFinalized { meeting, .. }
            | Self::MeetingStatus { meeting, .. } => meeting.as_ref(),
            _ => None,
        }
    }
}

/// Parses one push message from its JSON text.
pub fn parse_message(text: &str) -> Result<LiveMessage> {
    serde_json::from_str(text).context("Invalid live message")
}

/// Counters reported when a feed shuts down.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LiveFeedSummary {
    pub messages: usize,
    pub batches: usize,
    pub segments_accepted: usize,
    pub segments_rejected: usize,
    pub ignored: usize,
    pub errors: usize,
}

/// Consumes push messages and applies them to a transcript session.
pub struct LiveFeed {
    handle: TranscriptHandle,
    rx: mpsc::Receiver<LiveMessage>,
}

impl LiveFeed {
    pub fn new(handle: TranscriptHandle, rx: mpsc::Receiver<LiveMessage>) -> Self {
        Self { handle, rx }
    }

    /// Runs until every sender has been dropped.
    pub async fn run(mut self) -> LiveFeedSummary {
        let mut summary = LiveFeedSummary::default();

        while let Some(message) = self.rx.recv().await {
            summary.messages += 1;
            self.dispatch(message, &mut summary).await;
        }

        info!(
            "Live feed closed after {} messages ({} batches, {} segments accepted, {} rejected)",
            summary.messages, summary.batches, summary.segments_accepted, summary.segments_rejected
        );
        summary
    }

    pub fn spawn(self) -> JoinHandle<LiveFeedSummary> {
        tokio::spawn(self.run())
    }

    async fn dispatch(&self, message: LiveMessage, summary: &mut LiveFeedSummary) {
        if let Some(target) = message.meeting_ref() {
            let meeting = self.handle.meeting().await;
            if !target.matches(&meeting) {
                debug!("Ignoring message for another meeting: {:?}", target);
                summary.ignored += 1;
                return;
            }
        }

        match message {
            LiveMessage::TranscriptMutable { payload, .. }
            | LiveMessage::TranscriptFinalized { payload, .. } => {
                let report = self.handle.apply_live_batch(&payload.segments).await;
                summary.batches += 1;
                summary.segments_accepted += report.accepted();
                summary.segments_rejected += report.rejected.len();
            }
            LiveMessage::MeetingStatus { payload, .. } => {
                self.handle.set_status(payload.status).await;
            }
            LiveMessage::Error { error } => {
                warn!("Live channel reported an error: {}", error);
                summary.errors += 1;
            }
            LiveMessage::Subscribed | LiveMessage::Pong => {
                debug!("Live channel control message");
            }
            LiveMessage::Other => {
                debug!("Ignoring unknown live message type");
                summary.ignored += 1;
            }
        }
    }
}
