//! Collapses time-overlapping segments into a clean sequence.
//!
//! A single pass over segments sorted by start key. Each candidate is compared
//! only with the most recently accepted segment.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::segment::{
    clean_text, is_sorted_by_start_key, same_text, sort_by_start_key, word_count, Segment,
};

/// Tunables for the expansion and tail-repeat heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlapThresholds {
    /// Share of the earlier segment's duration the overlap must cover for a
    /// longer revision to replace it.
    pub expansion_min_overlap_ratio: f64,
    pub tail_repeat_max_duration_secs: f64,
    pub tail_repeat_max_words: usize,
    /// Share of the echoed fragment's own duration the overlap must cover.
    pub tail_repeat_min_overlap_ratio: f64,
}

impl Default for OverlapThresholds {
    fn default() -> Self {
        Self {
            expansion_min_overlap_ratio: 0.5,
            tail_repeat_max_duration_secs: 1.5,
            tail_repeat_max_words: 2,
            tail_repeat_min_overlap_ratio: 0.25,
        }
    }
}

/// Outcome of comparing a candidate with the last accepted segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapDecision {
    /// No time overlap, or a timestamp didn't parse.
    Disjoint,
    /// The candidate lies inside the last accepted segment.
    DropContained,
    /// The last accepted segment lies inside the candidate.
    ReplaceWithOuter,
    /// The candidate is a longer revision of the last accepted segment.
    Expand,
    /// The candidate echoes the tail of the last accepted segment.
    DropTailRepeat,
    /// Overlapping but distinct speech, e.g. cross-talk.
    KeepBoth,
}

impl OverlapDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disjoint => "disjoint",
            Self::DropContained => "drop_contained",
            Self::ReplaceWithOuter => "replace_with_outer",
            Self::Expand => "expand",
            Self::DropTailRepeat => "drop_tail_repeat",
            Self::KeepBoth => "keep_both",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OverlapResolver {
    thresholds: OverlapThresholds,
}

impl OverlapResolver {
    pub fn new(thresholds: OverlapThresholds) -> Self {
        Self { thresholds }
    }

    pub fn classify(&self, last: &Segment, seg: &Segment) -> OverlapDecision {
        let (Some(last_span), Some(seg_span)) = (last.interval(), seg.interval()) else {
            return OverlapDecision::Disjoint;
        };

        if !last_span.overlaps(&seg_span) {
            return OverlapDecision::Disjoint;
        }

        // One containment rule for both same-text and different-text pairs:
        // the outer segment survives.
        if last_span.contains(&seg_span) {
            return OverlapDecision::DropContained;
        }
        if seg_span.contains(&last_span) {
            return OverlapDecision::ReplaceWithOuter;
        }

        if same_text(&last.text, &seg.text) {
            return OverlapDecision::KeepBoth;
        }

        let overlap = last_span.overlap(&seg_span);
        let last_clean = clean_text(&last.text);
        let seg_clean = clean_text(&seg.text);

        let expands = !last_clean.is_empty()
            && last_clean != seg_clean
            && seg_clean.contains(&last_clean)
            && overlap >= self.thresholds.expansion_min_overlap_ratio * last_span.duration()
            && (seg.completed || !last.completed);
        if expands {
            return OverlapDecision::Expand;
        }

        let seg_duration = seg_span.duration();
        let repeats_tail = last_clean.contains(&seg_clean)
            && seg_duration < self.thresholds.tail_repeat_max_duration_secs
            && word_count(&seg.text) <= self.thresholds.tail_repeat_max_words
            && overlap >= self.thresholds.tail_repeat_min_overlap_ratio * seg_duration;
        if repeats_tail {
            return OverlapDecision::DropTailRepeat;
        }

        OverlapDecision::KeepBoth
    }

    /// Returns a new sequence with no contained ranges and no near-duplicates.
    ///
    /// Input is expected sorted by start key; unsorted input is sorted first.
    pub fn resolve(&self, sorted: &[Segment]) -> Vec<Segment> {
        let reordered;
        let input = if is_sorted_by_start_key(sorted) {
            sorted
        } else {
            warn!("Overlap resolver received unsorted segments, sorting by start key");
            let mut copy = sorted.to_vec();
            sort_by_start_key(&mut copy);
            reordered = copy;
            &reordered
        };

        let mut accepted: Vec<Segment> = Vec::with_capacity(input.len());

        for seg in input {
            let decision = match accepted.last() {
                Some(last) => self.classify(last, seg),
                None => OverlapDecision::Disjoint,
            };

            if decision != OverlapDecision::Disjoint {
                debug!("Overlap at {}: {}", seg.key(), decision.as_str());
            }

            match decision {
                OverlapDecision::Disjoint | OverlapDecision::KeepBoth => accepted.push(seg.clone()),
                OverlapDecision::DropContained | OverlapDecision::DropTailRepeat => {}
                OverlapDecision::ReplaceWithOuter | OverlapDecision::Expand => {
                    if let Some(last) = accepted.last_mut() {
                        *last = seg.clone();
                    }
                }
            }
        }

        accepted
    }
}

/// Resolves overlaps with the default thresholds.
pub fn resolve_overlaps(sorted: &[Segment]) -> Vec<Segment> {
    OverlapResolver::default().resolve(sorted)
}
