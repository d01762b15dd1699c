//! Segment reconciliation core.
//!
//! Pure data transformation, no I/O:
//! - [`merge`]: upsert incoming batches into a map keyed by absolute start time
//! - [`overlap`]: collapse overlapping entries of the sorted sequence

pub mod merge;
pub mod overlap;

pub use merge::{merge_batch, should_replace, upsert_segments, MergeOutcome, SegmentMap, UpsertReport};
pub use overlap::{resolve_overlaps, OverlapDecision, OverlapResolver, OverlapThresholds};

use crate::segment::Segment;

/// The map's values in key order, ready for the overlap resolver.
pub fn sorted_segments(map: &SegmentMap) -> Vec<Segment> {
    map.values().cloned().collect()
}
