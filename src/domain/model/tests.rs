// Unit tests for domain models

use super::*;
use crate::domain::rules::NaturalKey;

#[test]
fn test_time_span_valid() {
    let span = TimeSpan::new(1.5, 4.0).unwrap();
    assert_eq!(span.start, 1.5);
    assert_eq!(span.end, 4.0);
    assert_eq!(span.duration(), 2.5);
}

#[test]
fn test_time_span_rejects_inverted_and_empty() {
    assert!(TimeSpan::new(4.0, 1.0).is_err());
    assert!(TimeSpan::new(2.0, 2.0).is_err());
}

#[test]
fn test_time_span_rejects_negative_and_non_finite() {
    assert!(TimeSpan::new(-0.1, 1.0).is_err());
    assert!(TimeSpan::new(0.0, f64::INFINITY).is_err());
    assert!(TimeSpan::new(f64::NAN, 1.0).is_err());
}

#[test]
fn test_time_span_display() {
    let span = TimeSpan::new(1.5, 4.25).unwrap();
    assert_eq!(span.to_string(), "1.500s - 4.250s");
}

#[test]
fn test_silence_report_orders_by_start() {
    let report = SilenceReport::new(vec![
        TimeSpan::new(5.0, 6.0).unwrap(),
        TimeSpan::new(1.0, 2.0).unwrap(),
    ]);
    assert_eq!(report.len(), 2);
    assert_eq!(report.spans()[0].start, 1.0);
    assert_eq!(report.spans()[1].start, 5.0);
    assert_eq!(report.total_silence(), 2.0);
}

#[test]
fn test_edit_plan_durations() {
    let plan = EditPlan::from_ordered(
        vec![
            TimeSpan::new(0.0, 1.5).unwrap(),
            TimeSpan::new(4.5, 10.0).unwrap(),
        ],
        10.0,
    );
    assert!(!plan.is_empty());
    assert_eq!(plan.len(), 2);
    assert_eq!(plan.kept_duration(), 7.0);
    assert_eq!(plan.removed_duration(), 3.0);
}

#[test]
fn test_empty_edit_plan() {
    let plan = EditPlan::from_ordered(Vec::new(), 10.0);
    assert!(plan.is_empty());
    assert_eq!(plan.removed_duration(), 10.0);
}

#[test]
fn test_segment_duration_comes_from_source_span() {
    let segment = Segment::new(
        3,
        TimeSpan::new(2.0, 5.5).unwrap(),
        PathBuf::from("seg_0003.mp4"),
    );
    assert_eq!(segment.index, 3);
    assert_eq!(segment.duration(), 3.5);
}

#[test]
fn test_detection_mode_parse() {
    assert_eq!(DetectionMode::parse("mixed").unwrap(), DetectionMode::Mixed);
    assert_eq!(
        DetectionMode::parse("PER_CHANNEL").unwrap(),
        DetectionMode::PerChannel
    );
    assert_eq!(
        DetectionMode::parse("per-channel").unwrap(),
        DetectionMode::PerChannel
    );
    assert!(DetectionMode::parse("stereo").is_err());
}

#[test]
fn test_composition_mode_display() {
    assert_eq!(CompositionMode::HardCut.to_string(), "hard cut");
    assert_eq!(CompositionMode::Crossfade(0.5).to_string(), "crossfade 0.50s");
}

#[test]
fn test_batch_report_counters() {
    let item = |name: &str, status: BatchStatus| BatchItem {
        path: PathBuf::from(name),
        file_name: name.to_string(),
        sort_key: NaturalKey::from_name(name),
        already_processed: false,
        status,
    };
    let now = Utc::now();
    let report = BatchReport {
        folder: PathBuf::from("videos"),
        started_at: now,
        finished_at: now,
        items: vec![
            item(
                "1.mp4",
                BatchStatus::Succeeded {
                    output: PathBuf::from("1_autocut.mp4"),
                },
            ),
            item(
                "2.mp4",
                BatchStatus::Failed {
                    reason: "boom".to_string(),
                },
            ),
            item("3_autocut.mp4", BatchStatus::Skipped),
            item("4.mp4", BatchStatus::Cancelled),
        ],
    };
    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.cancelled(), 1);
}

#[test]
fn test_batch_status_serializes_with_tag() {
    let json = serde_json::to_string(&BatchStatus::Skipped).unwrap();
    assert_eq!(json, r#"{"status":"skipped"}"#);
}
