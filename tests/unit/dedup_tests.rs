/*!
 * Tests for consecutive duplicate removal
 */

use vidtrans::dedup::dedup_consecutive;
use vidtrans::transcription::Segment;

fn texts(segments: &[Segment]) -> Vec<&str> {
    segments.iter().map(|s| s.text.as_str()).collect()
}

/// Test that only the immediately repeated segment is removed
#[test]
fn test_dedup_withRepeatSeparatedByOtherText_shouldKeepLaterRepeat() {
    let segments = vec![
        Segment::new(0.0, 1.0, "a"),
        Segment::new(1.0, 2.0, "a"),
        Segment::new(2.0, 3.0, "b"),
        Segment::new(3.0, 4.0, "a"),
    ];

    let kept = dedup_consecutive(segments);

    assert_eq!(texts(&kept), vec!["a", "b", "a"]);
    let starts: Vec<f64> = kept.iter().map(|s| s.start).collect();
    assert_eq!(starts, vec![0.0, 2.0, 3.0]);
}

/// Test that a run of repeats collapses to its first segment
#[test]
fn test_dedup_withLongRun_shouldKeepFirstTimings() {
    let segments = vec![
        Segment::new(0.0, 1.0, "again"),
        Segment::new(1.0, 2.0, "again"),
        Segment::new(2.0, 3.0, "again"),
    ];

    let kept = dedup_consecutive(segments);

    assert_eq!(kept, vec![Segment::new(0.0, 1.0, "again")]);
}

/// Test that comparison is case-sensitive
#[test]
fn test_dedup_withDifferentCase_shouldKeepBoth() {
    let kept = dedup_consecutive(vec![
        Segment::new(0.0, 1.0, "Hello"),
        Segment::new(1.0, 2.0, "hello"),
    ]);
    assert_eq!(kept.len(), 2);
}

/// Test that leading blank segments compare equal to the empty starting value
#[test]
fn test_dedup_withLeadingBlankSegment_shouldDropIt() {
    let kept = dedup_consecutive(vec![
        Segment::new(0.0, 0.5, "   "),
        Segment::new(0.5, 1.0, "Words"),
    ]);
    assert_eq!(texts(&kept), vec!["Words"]);
}

/// Test that running the filter again changes nothing
#[test]
fn test_dedup_withDeduplicatedInput_shouldBeStable() {
    let once = dedup_consecutive(vec![
        Segment::new(0.0, 1.0, "x "),
        Segment::new(1.0, 2.0, " x"),
        Segment::new(2.0, 3.0, "y"),
    ]);
    let twice = dedup_consecutive(once.clone());
    assert_eq!(once, twice);
}
