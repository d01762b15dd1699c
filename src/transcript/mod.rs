//! Transcript session state.
//!
//! A [`TranscriptSession`] owns one meeting's merge map and its resolved
//! segment sequence. Bootstrap snapshots and live batches both go through
//! the same merge, then the sequence is re-resolved and the meeting start
//! time backfilled.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::meeting::{MeetingRecord, MeetingStatus};
use crate::reconcile::{merge_batch, sorted_segments, OverlapResolver, SegmentMap, UpsertReport};
use crate::segment::{Segment, SegmentBatch, SegmentRejection};
use crate::snapshot::TranscriptSnapshot;

#[derive(Debug, Clone, Default)]
pub struct TranscriptSession {
    meeting: MeetingRecord,
    map: SegmentMap,
    resolved: Vec<Segment>,
    resolver: OverlapResolver,
    revision: u64,
}

impl TranscriptSession {
    pub fn new(meeting: MeetingRecord, resolver: OverlapResolver) -> Self {
        Self {
            meeting,
            resolver,
            ..Default::default()
        }
    }

    pub fn meeting(&self) -> &MeetingRecord {
        &self.meeting
    }

    /// The resolved, chronologically ordered segments.
    pub fn segments(&self) -> &[Segment] {
        &self.resolved
    }

    /// Number of distinct keys in the merge map, before overlap resolution.
    pub fn merged_len(&self) -> usize {
        self.map.len()
    }

    /// Bumped each time the resolved sequence changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Seeds the session from a bootstrap snapshot.
    ///
    /// The snapshot merges under the same revision rules as live batches, so a
    /// snapshot fetched after live updates cannot roll back newer revisions.
    pub fn bootstrap(&mut self, snapshot: &TranscriptSnapshot) -> UpsertReport {
        if self.meeting.platform.is_empty() && self.meeting.native_meeting_id.is_empty() {
            self.meeting.platform = snapshot.platform.clone();
            self.meeting.native_meeting_id = snapshot.native_meeting_id.clone();
        }
        if self.meeting.id.is_none() {
            self.meeting.id = snapshot.id;
        }
        if self.meeting.start_time.is_none() {
            self.meeting.start_time = snapshot.start_time.clone();
        }
        if self.meeting.end_time.is_none() {
            self.meeting.end_time = snapshot.end_time.clone();
        }
        // A live status update may already have landed; an unknown status
        // in the snapshot must not erase it.
        if snapshot.status != MeetingStatus::Unknown {
            self.meeting.status = snapshot.status;
        }

        info!(
            "Bootstrapping transcript for {}/{} with {} segments",
            self.meeting.platform,
            self.meeting.native_meeting_id,
            snapshot.segments.len()
        );
        self.apply(&snapshot.segments.segments, &snapshot.segments.malformed)
    }

    /// Merges one live push-channel batch.
    pub fn apply_live(&mut self, batch: &[Segment]) -> UpsertReport {
        debug!("Applying live batch of {} segments", batch.len());
        self.apply(batch, &[])
    }

    /// Like [`apply_live`](Self::apply_live), also reporting records that
    /// failed to decode.
    pub fn apply_live_batch(&mut self, batch: &SegmentBatch) -> UpsertReport {
        debug!("Applying live batch of {} records", batch.len());
        self.apply(&batch.segments, &batch.malformed)
    }

    pub fn set_status(&mut self, status: MeetingStatus) {
        if self.meeting.status != status {
            info!(
                "Meeting {}/{} status {} -> {}",
                self.meeting.platform,
                self.meeting.native_meeting_id,
                self.meeting.status.as_str(),
                status.as_str()
            );
            self.meeting.status = status;
            if status.is_terminal() {
                info!("Meeting ended, no further live segments expected");
            }
        }
    }

    /// Clears the transcript on session teardown. The meeting record,
    /// including a backfilled start time, is kept.
    pub fn reset(&mut self) {
        info!(
            "Resetting transcript for {}/{}",
            self.meeting.platform, self.meeting.native_meeting_id
        );
        self.map.clear();
        if !self.resolved.is_empty() {
            self.resolved.clear();
            self.revision += 1;
        }
    }

    fn apply(&mut self, batch: &[Segment], malformed: &[SegmentRejection]) -> UpsertReport {
        let mut outcome = merge_batch(&self.map, batch);
        outcome.report.rejected.extend(malformed.iter().cloned());

        if !outcome.report.rejected.is_empty() {
            warn!(
                "Rejected {} of {} segments",
                outcome.report.rejected.len(),
                batch.len() + malformed.len()
            );
        }

        if outcome.report.changed() {
            self.map = outcome.map;
            let resolved = self.resolver.resolve(&sorted_segments(&self.map));
            if resolved != self.resolved {
                self.resolved = resolved;
                self.revision += 1;
            }
        }

        self.meeting.backfill_start_time(&self.resolved);

        outcome.report
    }
}

/// Thread-safe handle for sharing a session between the live feed and readers.
#[derive(Clone, Default)]
pub struct TranscriptHandle {
    inner: Arc<Mutex<TranscriptSession>>,
}

impl TranscriptHandle {
    pub fn new(session: TranscriptSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    pub async fn bootstrap(&self, snapshot: &TranscriptSnapshot) -> UpsertReport {
        self.inner.lock().await.bootstrap(snapshot)
    }

    pub async fn apply_live(&self, batch: &[Segment]) -> UpsertReport {
        self.inner.lock().await.apply_live(batch)
    }

    pub async fn apply_live_batch(&self, batch: &SegmentBatch) -> UpsertReport {
        self.inner.lock().await.apply_live_batch(batch)
    }

    pub async fn set_status(&self, status: MeetingStatus) {
        self.inner.lock().await.set_status(status);
    }

    pub async fn reset(&self) {
        self.inner.lock().await.reset();
    }

    /// An owned copy of the resolved segments.
    pub async fn segments(&self) -> Vec<Segment> {
        self.inner.lock().await.segments().to_vec()
    }

    pub async fn meeting(&self) -> MeetingRecord {
        self.inner.lock().await.meeting().clone()
    }

    pub async fn revision(&self) -> u64 {
        self.inner.lock().await.revision()
    }
}
