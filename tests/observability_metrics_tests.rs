use std::sync::Arc;
use xritkit::observability::{AssemblyMetrics, MetricsSnapshot};

#[test]
fn test_counters_start_at_zero() {
    let metrics = AssemblyMetrics::new();
    assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
}

#[test]
fn test_record_and_snapshot() {
    let metrics = AssemblyMetrics::new();

    metrics.record_segment_accepted();
    metrics.record_segment_accepted();
    metrics.record_segment_rejected();
    metrics.record_frame_created();
    metrics.record_frame_completed();
    metrics.record_frame_consumed();
    metrics.record_frame_evicted();
    metrics.record_frame_failed();
    metrics.record_retry_requested();

    assert_eq!(metrics.segments_accepted(), 2);
    assert_eq!(metrics.segments_rejected(), 1);
    assert_eq!(
        metrics.snapshot(),
        MetricsSnapshot {
            segments_accepted: 2,
            segments_rejected: 1,
            frames_created: 1,
            frames_completed: 1,
            frames_consumed: 1,
            frames_evicted: 1,
            frames_failed: 1,
            retries_requested: 1,
        }
    );
}

#[test]
fn test_concurrent_updates() {
    let metrics = Arc::new(AssemblyMetrics::new());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let metrics = metrics.clone();
            std::thread::spawn(move || {
                for _ in 0..1000 {
                    metrics.record_segment_accepted();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(metrics.segments_accepted(), 4000);
}

#[test]
fn test_snapshot_serializes() {
    let metrics = AssemblyMetrics::new();
    metrics.record_frame_completed();

    let json = serde_json::to_value(metrics.snapshot()).unwrap();
    assert_eq!(json["frames_completed"], 1);
    assert_eq!(json["segments_rejected"], 0);
}
