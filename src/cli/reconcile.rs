//! CLI handler for the reconcile command.
//!
//! Bootstraps a session from a snapshot file, replays live messages through
//! the live feed, and prints the resolved segments as JSON.

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::Config;
use crate::live::{parse_message, LiveFeed, LiveFeedSummary};
use crate::meeting::MeetingRecord;
use crate::reconcile::OverlapResolver;
use crate::snapshot::{FileSnapshotSource, SnapshotSource};
use crate::transcript::{TranscriptHandle, TranscriptSession};

use super::args::ReconcileCliArgs;

pub async fn handle_reconcile_command(args: ReconcileCliArgs, config: &Config) -> Result<()> {
    let platform = args.platform.clone().unwrap_or_default();
    let meeting_id = args.meeting_id.clone().unwrap_or_default();

    let source = FileSnapshotSource::new(&args.snapshot);
    info!("Fetching bootstrap snapshot from {} source", source.name());
    let snapshot = source
        .fetch(&platform, &meeting_id)
        .await
        .context("Failed to load bootstrap snapshot")?;

    let session = TranscriptSession::new(
        MeetingRecord::new(platform, meeting_id),
        OverlapResolver::new(config.reconcile),
    );
    let handle = TranscriptHandle::new(session);

    let report = handle.bootstrap(&snapshot).await;
    info!(
        "Bootstrap merged {} segments ({} rejected)",
        report.accepted(),
        report.rejected.len()
    );

    let summary = match &args.live {
        Some(path) => Some(replay_live(path, &handle, config).await?),
        None => None,
    };

    let segments = handle.segments().await;
    let json = serde_json::to_string_pretty(&segments).context("Failed to serialize segments")?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, json + "\n")
                .with_context(|| format!("Failed to write output file {:?}", path))?;
            info!("Wrote {} segments to {:?}", segments.len(), path);
        }
        None => println!("{}", json),
    }

    let meeting = handle.meeting().await;
    let rejected = report.rejected.len() + summary.as_ref().map_or(0, |s| s.segments_rejected);
    eprintln!(
        "{} segments | {} rejected | status: {} | start: {}",
        segments.len(),
        rejected,
        meeting.status.as_str(),
        meeting.start_time.as_deref().unwrap_or("unknown")
    );

    Ok(())
}

async fn replay_live(
    path: &std::path::Path,
    handle: &TranscriptHandle,
    config: &Config,
) -> Result<LiveFeedSummary> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read live messages from {:?}", path))?;

    let (tx, rx) = mpsc::channel(config.live.channel_capacity.max(1));
    let feed = LiveFeed::new(handle.clone(), rx).spawn();

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_message(line) {
            Ok(message) => {
                if tx.send(message).await.is_err() {
                    warn!("Live feed stopped before all messages were sent");
                    break;
                }
            }
            Err(e) => warn!("Skipping live message on line {}: {:#}", index + 1, e),
        }
    }
    drop(tx);

    feed.await.context("Live feed task failed")
}
