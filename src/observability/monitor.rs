use super::AssemblyMetrics;
use std::sync::Arc;

pub struct AssemblyMonitor {
    metrics: Arc<AssemblyMetrics>,
}

impl AssemblyMonitor {
    pub fn new(metrics: Arc<AssemblyMetrics>) -> Self {
        Self { metrics }
    }

    pub fn generate_report(&self) -> String {
        let snapshot = self.metrics.snapshot();

        let mut report = String::from("=== Frame Assembly Metrics ===\n");
        report.push_str(&format!(
            "\n[segments]\n  Accepted: {}\n  Rejected: {}\n",
            snapshot.segments_accepted, snapshot.segments_rejected
        ));
        report.push_str(&format!(
            "\n[frames]\n  Created: {}\n  Completed: {}\n  Consumed: {}\n  Evicted: {}\n  Failed: {}\n  Retries: {}\n",
            snapshot.frames_created,
            snapshot.frames_completed,
            snapshot.frames_consumed,
            snapshot.frames_evicted,
            snapshot.frames_failed,
            snapshot.retries_requested
        ));

        report
    }

    pub fn metrics(&self) -> &Arc<AssemblyMetrics> {
        &self.metrics
    }
}
