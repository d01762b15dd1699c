//! Upsert-by-key merge of incoming segment batches.

use std::collections::BTreeMap;

use tracing::debug;

use crate::segment::{parse_utc, same_text, Segment, SegmentRejection};

/// Latest known revision of each segment, keyed by absolute start time.
///
/// Iteration order is the key order, which is chronological for the fixed-width
/// ISO timestamps the producers emit.
pub type SegmentMap = BTreeMap<String, Segment>;

/// What a single merge did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpsertReport {
    pub inserted: usize,
    pub replaced: usize,
    pub unchanged: usize,
    pub rejected: Vec<SegmentRejection>,
}

impl UpsertReport {
    /// True when the merge produced different map content.
    pub fn changed(&self) -> bool {
        self.inserted > 0 || self.replaced > 0
    }

    pub fn accepted(&self) -> usize {
        self.inserted + self.replaced + self.unchanged
    }
}

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub map: SegmentMap,
    pub report: UpsertReport,
}

/// Merges `incoming` into a copy of `existing`.
pub fn upsert_segments(existing: &SegmentMap, incoming: &[Segment]) -> SegmentMap {
    merge_batch(existing, incoming).map
}

/// Like [`upsert_segments`], also reporting what happened to each segment.
pub fn merge_batch(existing: &SegmentMap, incoming: &[Segment]) -> MergeOutcome {
    let mut map = existing.clone();
    let mut report = UpsertReport::default();

    for segment in incoming {
        if let Err(rejection) = segment.validate() {
            debug!("Skipping segment: {}", rejection);
            report.rejected.push(rejection);
            continue;
        }

        let action = match map.get(segment.key()) {
            None => Action::Insert,
            Some(current) if current == segment => Action::Keep,
            Some(current) if should_replace(current, segment) => Action::Replace,
            Some(_) => Action::Keep,
        };

        match action {
            Action::Insert => {
                map.insert(segment.key().to_string(), segment.clone());
                report.inserted += 1;
            }
            Action::Replace => {
                debug!("Replacing segment at {}", segment.key());
                map.insert(segment.key().to_string(), segment.clone());
                report.replaced += 1;
            }
            Action::Keep => report.unchanged += 1,
        }
    }

    MergeOutcome { map, report }
}

enum Action {
    Insert,
    Replace,
    Keep,
}

/// Decides whether `incoming` supersedes `existing` for the same key.
///
/// A text change or a change of the `completed` flag always wins. Otherwise a
/// strictly newer `updated_at` wins when both sides carry one, and without a
/// pair of revision stamps the last write wins.
pub fn should_replace(existing: &Segment, incoming: &Segment) -> bool {
    if !same_text(&existing.text, &incoming.text) || existing.completed != incoming.completed {
        return true;
    }

    match (existing.updated_at.as_deref(), incoming.updated_at.as_deref()) {
        (Some(current), Some(candidate)) => is_newer(candidate, current),
        _ => true,
    }
}

fn is_newer(candidate: &str, current: &str) -> bool {
    match (parse_utc(candidate), parse_utc(current)) {
        (Some(candidate), Some(current)) => candidate > current,
        _ => candidate > current,
    }
}
