//! Bootstrap snapshots.
//!
//! A snapshot is the point-in-time transcript the backend returns for a
//! meeting, keyed by platform and native meeting id. Fetching it over HTTP is
//! the dashboard's job; this module defines the payload and the source seam.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::meeting::{MeetingRecord, MeetingStatus};
use crate::segment::SegmentBatch;

/// Transcript payload of a bootstrap fetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub native_meeting_id: String,
    #[serde(default)]
    pub status: MeetingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default)]
    pub segments: SegmentBatch,
}

impl TranscriptSnapshot {
    pub fn meeting(&self) -> MeetingRecord {
        MeetingRecord {
            id: self.id,
            platform: self.platform.clone(),
            native_meeting_id: self.native_meeting_id.clone(),
            status: self.status,
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone(),
        }
    }
}

/// Something that can produce a bootstrap snapshot for a meeting.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self, platform: &str, native_meeting_id: &str) -> Result<TranscriptSnapshot>;
}

/// Reads snapshots from JSON files on disk.
///
/// Either a single file, or a directory laid out as
/// `<dir>/<platform>/<native_meeting_id>.json`.
pub struct FileSnapshotSource {
    path: PathBuf,
}

impl FileSnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn resolve_path(&self, platform: &str, native_meeting_id: &str) -> PathBuf {
        if self.path.is_dir() {
            self.path
                .join(platform)
                .join(format!("{}.json", native_meeting_id))
        } else {
            self.path.clone()
        }
    }
}

#[async_trait]
impl SnapshotSource for FileSnapshotSource {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn fetch(&self, platform: &str, native_meeting_id: &str) -> Result<TranscriptSnapshot> {
        let path = self.resolve_path(platform, native_meeting_id);
        debug!("Reading snapshot from {:?}", path);

        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read snapshot file {:?}", path))?;

        let mut snapshot = parse_snapshot(&content)
            .with_context(|| format!("Failed to parse snapshot file {:?}", path))?;

        if snapshot.platform.is_empty() {
            snapshot.platform = platform.to_string();
        }
        if snapshot.native_meeting_id.is_empty() {
            snapshot.native_meeting_id = native_meeting_id.to_string();
        }

        info!(
            "Loaded snapshot for {}/{} with {} segments",
            snapshot.platform,
            snapshot.native_meeting_id,
            snapshot.segments.len()
        );
        Ok(snapshot)
    }
}

/// Parses a snapshot document. A bare array of segments is accepted too.
pub fn parse_snapshot(content: &str) -> Result<TranscriptSnapshot> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Document {
        Snapshot(TranscriptSnapshot),
        Segments(SegmentBatch),
    }

    let document: Document = serde_json::from_str(content).context("Invalid snapshot JSON")?;
    Ok(match document {
        Document::Snapshot(snapshot) => snapshot,
        Document::Segments(segments) => TranscriptSnapshot {
            segments,
            ..Default::default()
        },
    })
}
