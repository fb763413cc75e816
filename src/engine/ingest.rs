use super::{GroupRegistry, SegmentOutcome};
use crate::source::SegmentSource;
use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub received: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub completed: u64,
}

/// Pumps segments from a source into the registry
pub struct IngestService {
    registry: Arc<GroupRegistry>,
}

impl IngestService {
    pub fn new(registry: Arc<GroupRegistry>) -> Self {
        Self { registry }
    }

    /// Drains `source` until it ends. Rejected segments are counted, not fatal;
    /// only a failing source stops the loop early.
    pub async fn run<S>(&self, source: &mut S) -> Result<IngestReport>
    where
        S: SegmentSource + ?Sized,
    {
        let mut report = IngestReport::default();

        while let Some(segment) = source
            .next_segment()
            .await
            .context("Segment source failed")?
        {
            report.received += 1;
            match self.registry.on_segment(segment) {
                Ok(SegmentOutcome::Accepted) => report.accepted += 1,
                Ok(SegmentOutcome::Completed) => {
                    report.accepted += 1;
                    report.completed += 1;
                }
                Err(_) => report.rejected += 1,
            }
        }

        info!(
            "Ingest finished: {} segments, {} rejected, {} frames completed",
            report.received, report.rejected, report.completed
        );
        Ok(report)
    }

    /// Runs the loop on its own task
    pub fn spawn(self, mut source: Box<dyn SegmentSource>) -> JoinHandle<Result<IngestReport>> {
        tokio::spawn(async move { self.run(source.as_mut()).await })
    }
}
