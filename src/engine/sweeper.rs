use super::GroupRegistry;
use anyhow::{Context, Result};
use log::debug;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Background task running `GroupRegistry::sweep` on a fixed interval
pub struct Sweeper {
    shutdown_tx: broadcast::Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl Sweeper {
    pub fn spawn(registry: Arc<GroupRegistry>, interval: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    _ = ticker.tick() => {
                        let report = registry.sweep_now();
                        if report.removed() > 0 || report.retried > 0 {
                            debug!(
                                "Sweep: {} kept, {} consumed, {} evicted, {} failed, {} retried",
                                report.kept, report.consumed, report.evicted, report.failed, report.retried
                            );
                        }
                    }
                }
            }
        });

        Self {
            shutdown_tx,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Stops the task and waits for it to exit
    pub async fn shutdown(mut self) -> Result<()> {
        let _ = self.shutdown_tx.send(());
        if let Some(handle) = self.handle.take() {
            handle.await.context("Sweeper task panicked")?;
        }
        Ok(())
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        // Can't await here; the task exits on its next select
        let _ = self.shutdown_tx.send(());
    }
}
