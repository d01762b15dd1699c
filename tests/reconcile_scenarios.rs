//! End-to-end reconciliation scenarios through the public API.

use serde_json::json;
use vexa_transcripts::live::{parse_message, LiveMessage};
use vexa_transcripts::meeting::MeetingStatus;
use vexa_transcripts::reconcile::{
    merge_batch, resolve_overlaps, sorted_segments, upsert_segments, SegmentMap,
};
use vexa_transcripts::segment::{Segment, SegmentRejection};
use vexa_transcripts::snapshot::TranscriptSnapshot;
use vexa_transcripts::transcript::TranscriptSession;

fn at(seconds: f64) -> String {
    let whole = seconds.floor() as i64;
    let millis = ((seconds - seconds.floor()) * 1000.0).round() as i64;
    format!("2025-03-01T10:{:02}:{:02}.{:03}Z", whole / 60, whole % 60, millis)
}

fn seg(start: f64, end: f64, text: &str, completed: bool) -> Segment {
    serde_json::from_value(json!({
        "start": start,
        "end": end,
        "absolute_start_time": at(start),
        "absolute_end_time": at(end),
        "text": text,
        "speaker": "Alice",
        "language": "en",
        "completed": completed,
    }))
    .unwrap()
}

fn texts(segments: &[Segment]) -> Vec<&str> {
    segments.iter().map(|s| s.text.as_str()).collect()
}

fn reconcile(batch: &[Segment]) -> Vec<Segment> {
    let map = upsert_segments(&SegmentMap::new(), batch);
    resolve_overlaps(&sorted_segments(&map))
}

#[test]
fn test_expansion_scenario() {
    let out = reconcile(&[
        seg(10.0, 11.0, "It was a milestone.", false),
        seg(10.0, 13.0, "It was a milestone to get here.", true),
    ]);
    assert_eq!(texts(&out), vec!["It was a milestone to get here."]);
    assert!(out[0].completed);
}

#[test]
fn test_tail_repeat_scenario() {
    let out = reconcile(&[
        seg(5.0, 8.0, "we shipped the release", false),
        seg(7.8, 8.3, "release", true),
    ]);
    assert_eq!(texts(&out), vec!["we shipped the release"]);
}

#[test]
fn test_full_containment_scenario() {
    let out = reconcile(&[seg(0.0, 10.0, "hello world", false), seg(2.0, 4.0, "hello world", false)]);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].absolute_start_time, at(0.0));
}

#[test]
fn test_non_overlapping_passthrough() {
    let out = reconcile(&[seg(4.0, 6.0, "later", true), seg(0.0, 2.0, "earlier", true)]);
    assert_eq!(texts(&out), vec!["earlier", "later"]);
}

#[test]
fn test_malformed_rejection() {
    let outcome = merge_batch(
        &SegmentMap::new(),
        &[seg(0.0, 1.0, "   ", false), seg(2.0, 3.0, "valid", true)],
    );
    assert_eq!(outcome.map.len(), 1);
    assert_eq!(outcome.map[&at(2.0)].text, "valid");
    assert!(matches!(
        outcome.report.rejected[0],
        SegmentRejection::EmptyText { .. }
    ));
}

#[test]
fn test_revision_precedence_ignores_stamps_when_text_changes() {
    let mut newer_stamp = seg(0.0, 2.0, "first take", false);
    newer_stamp.updated_at = Some("2025-03-01T11:00:00Z".to_string());
    let mut older_stamp = seg(0.0, 2.0, "first take, revised", false);
    older_stamp.updated_at = Some("2025-03-01T10:00:00Z".to_string());

    let map = upsert_segments(&SegmentMap::new(), &[newer_stamp]);
    let map = upsert_segments(&map, &[older_stamp]);
    assert_eq!(map[&at(0.0)].text, "first take, revised");
}

#[test]
fn test_upsert_idempotent_and_keys_unique() {
    let batch = vec![
        seg(0.0, 1.0, "one", false),
        seg(0.0, 1.5, "one more", false),
        seg(3.0, 4.0, "two", true),
        seg(3.0, 4.0, "two", true),
    ];
    let once = upsert_segments(&SegmentMap::new(), &batch);
    let twice = upsert_segments(&once, &batch);

    assert_eq!(once, twice);
    assert_eq!(once.len(), 2);
}

#[test]
fn test_output_sorted_without_containment() {
    let batch = vec![
        seg(12.0, 14.0, "and then", false),
        seg(0.0, 3.0, "good morning everyone", true),
        seg(1.0, 2.0, "morning", false),
        seg(2.5, 6.0, "let's get started", true),
        seg(5.9, 6.2, "started", true),
        seg(7.0, 9.0, "first item", false),
        seg(7.0, 11.0, "first item is the budget", true),
        seg(10.5, 12.5, "right", false),
    ];
    let out = reconcile(&batch);

    for pair in out.windows(2) {
        assert!(pair[0].absolute_start_time <= pair[1].absolute_start_time);
        let a = pair[0].interval().unwrap();
        let b = pair[1].interval().unwrap();
        assert!(!a.contains(&b), "{:?} contains {:?}", pair[0].text, pair[1].text);
        assert!(!b.contains(&a), "{:?} contains {:?}", pair[1].text, pair[0].text);
    }
    assert!(!texts(&out).contains(&"morning"));
    assert!(!texts(&out).contains(&"started"));
    assert!(texts(&out).contains(&"first item is the budget"));
}

#[test]
fn test_bootstrap_after_live_does_not_regress() {
    let mut session = TranscriptSession::default();

    let mut live = seg(0.0, 2.0, "same words", true);
    live.updated_at = Some("2025-03-01T10:00:05Z".to_string());
    live.speaker = "Alice (corrected)".to_string();
    session.apply_live(&[live]);

    let mut stale = seg(0.0, 2.0, "same words", true);
    stale.updated_at = Some("2025-03-01T10:00:03Z".to_string());
    let snapshot = TranscriptSnapshot {
        platform: "google_meet".to_string(),
        native_meeting_id: "abc-defg-hij".to_string(),
        status: MeetingStatus::Active,
        segments: vec![stale].into(),
        ..Default::default()
    };
    let report = session.bootstrap(&snapshot);

    assert!(!report.changed());
    assert_eq!(session.segments()[0].speaker, "Alice (corrected)");
    assert_eq!(session.meeting().start_time.as_deref(), Some(at(0.0).as_str()));
}

#[test]
fn test_naive_and_zulu_timestamps_mix() {
    let mut naive = seg(0.0, 10.0, "hello world", false);
    naive.absolute_start_time = "2025-03-01T10:00:00.000".to_string();
    naive.absolute_end_time = "2025-03-01T10:00:10.000".to_string();
    let inner = seg(2.0, 4.0, "hello world", false);

    let out = resolve_overlaps(&[naive, inner]);
    assert_eq!(out.len(), 1);
}

#[test]
fn test_threshold_boundaries_are_inclusive() {
    let out = reconcile(&[
        seg(0.0, 0.3, "we should", false),
        seg(0.15, 3.3, "we should ship it", false),
    ]);
    assert_eq!(texts(&out), vec!["we should ship it"]);

    let out = reconcile(&[
        seg(5.0, 8.0, "we shipped the release on time", false),
        seg(7.7, 8.9, "on time", true),
    ]);
    assert_eq!(texts(&out), vec!["we shipped the release on time"]);
}

#[test]
fn test_badly_typed_record_does_not_sink_live_batch() {
    let message = parse_message(
        &json!({
            "type": "transcript.mutable",
            "payload": {"segments": [
                {"absolute_start_time": at(0.0), "absolute_end_time": at(1.0), "text": "hello"},
                {"absolute_start_time": 1740823205, "text": "broken"},
            ]},
        })
        .to_string(),
    )
    .unwrap();

    let LiveMessage::TranscriptMutable { payload, .. } = message else {
        panic!("expected a transcript message");
    };
    let mut session = TranscriptSession::default();
    let report = session.apply_live_batch(&payload.segments);

    assert_eq!(texts(session.segments()), vec!["hello"]);
    assert!(matches!(
        report.rejected[0],
        SegmentRejection::Malformed { index: 1, .. }
    ));
}
