use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub segments_accepted: u64,
    pub segments_rejected: u64,
    pub frames_created: u64,
    pub frames_completed: u64,
    pub frames_consumed: u64,
    pub frames_evicted: u64,
    pub frames_failed: u64,
    pub retries_requested: u64,
}

/// Counters shared by the registry, the sweeper and the ingest loop
#[derive(Debug, Default)]
pub struct AssemblyMetrics {
    segments_accepted: AtomicU64,
    segments_rejected: AtomicU64,
    frames_created: AtomicU64,
    frames_completed: AtomicU64,
    frames_consumed: AtomicU64,
    frames_evicted: AtomicU64,
    frames_failed: AtomicU64,
    retries_requested: AtomicU64,
}

impl AssemblyMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_segment_accepted(&self) {
        self.segments_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_segment_rejected(&self) {
        self.segments_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_frame_created(&self) {
        self.frames_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_frame_completed(&self) {
        self.frames_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_frame_consumed(&self) {
        self.frames_consumed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_frame_evicted(&self) {
        self.frames_evicted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_frame_failed(&self) {
        self.frames_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retry_requested(&self) {
        self.retries_requested.fetch_add(1, Ordering::Relaxed);
    }

    pub fn segments_accepted(&self) -> u64 {
        self.segments_accepted.load(Ordering::Relaxed)
    }

    pub fn segments_rejected(&self) -> u64 {
        self.segments_rejected.load(Ordering::Relaxed)
    }

    pub fn frames_completed(&self) -> u64 {
        self.frames_completed.load(Ordering::Relaxed)
    }

    pub fn frames_failed(&self) -> u64 {
        self.frames_failed.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            segments_accepted: self.segments_accepted.load(Ordering::Relaxed),
            segments_rejected: self.segments_rejected.load(Ordering::Relaxed),
            frames_created: self.frames_created.load(Ordering::Relaxed),
            frames_completed: self.frames_completed.load(Ordering::Relaxed),
            frames_consumed: self.frames_consumed.load(Ordering::Relaxed),
            frames_evicted: self.frames_evicted.load(Ordering::Relaxed),
            frames_failed: self.frames_failed.load(Ordering::Relaxed),
            retries_requested: self.retries_requested.load(Ordering::Relaxed),
        }
    }
}
