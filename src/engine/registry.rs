use super::events::{
    CompletedFrame, EvictionNotice, RegistryEvent, RetryRequest, SegmentOutcome, SharedGroup,
    SweepReport,
};
use crate::assembly::{FrameGroup, SegmentError};
use crate::config::AssemblerConfig;
use crate::core::{ChannelKey, Clock, FrameId, Segment};
use crate::geo::GeoCatalog;
use crate::observability::AssemblyMetrics;
use crate::resilience::{RetryPolicy, StaleAction};
use chrono::{DateTime, Duration, Utc};
use crossbeam_channel::{Receiver, Sender};
use log::{debug, info, warn};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

/// Live frame groups of one ingestion session.
///
/// The table lock is only held to look up, insert or remove entries, never
/// while waiting on a group's mutex. Arrivals for one frame serialize on that
/// frame's mutex; unrelated frames proceed in parallel. The sweep only
/// `try_lock`s groups, so a consumer holding a completed group stalls nothing
/// but that group.
pub struct GroupRegistry {
    groups: RwLock<HashMap<FrameId, SharedGroup>>,
    crop_image: bool,
    timeout: Duration,
    retry_policy: RetryPolicy,
    catalog: GeoCatalog,
    clock: Arc<dyn Clock>,
    events: Sender<RegistryEvent>,
    metrics: Arc<AssemblyMetrics>,
}

impl GroupRegistry {
    pub fn new(config: AssemblerConfig, clock: Arc<dyn Clock>) -> (Self, Receiver<RegistryEvent>) {
        let (events, events_rx) = crossbeam_channel::unbounded();

        let registry = Self {
            groups: RwLock::new(HashMap::new()),
            crop_image: config.crop_image,
            timeout: config.timeout(),
            retry_policy: config.retry_policy(),
            catalog: config.build_catalog(),
            clock,
            events,
            metrics: Arc::new(AssemblyMetrics::new()),
        };

        (registry, events_rx)
    }

    /// Replace the geometry catalog built from the config
    pub fn with_catalog(mut self, catalog: GeoCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn metrics(&self) -> &Arc<AssemblyMetrics> {
        &self.metrics
    }

    pub fn catalog(&self) -> &GeoCatalog {
        &self.catalog
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn len(&self) -> usize {
        self.groups.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.read().is_empty()
    }

    pub fn contains(&self, id: &FrameId) -> bool {
        self.groups.read().contains_key(id)
    }

    pub fn group(&self, id: &FrameId) -> Option<SharedGroup> {
        self.groups.read().get(id).cloned()
    }

    pub fn ids(&self) -> Vec<FrameId> {
        self.groups.read().keys().cloned().collect()
    }

    /// Live entry for `id`, inserted if missing
    fn lookup_or_insert(&self, id: &FrameId) -> SharedGroup {
        if let Some(shared) = self.groups.read().get(id) {
            return shared.clone();
        }

        self.groups
            .write()
            .entry(id.clone())
            .or_insert_with(|| {
                let mut group = FrameGroup::new(id.clone(), self.clock.now());
                group.crop_image = self.crop_image;
                self.metrics.record_frame_created();
                debug!("New frame group {}", id);
                Arc::new(Mutex::new(group))
            })
            .clone()
    }

    fn is_live(&self, id: &FrameId, shared: &SharedGroup) -> bool {
        self.groups
            .read()
            .get(id)
            .is_some_and(|live| Arc::ptr_eq(live, shared))
    }

    /// Drops the table entry for `id` if it is still `shared`
    fn unlink(&self, id: &FrameId, shared: &SharedGroup) {
        let mut groups = self.groups.write();
        if groups.get(id).is_some_and(|live| Arc::ptr_eq(live, shared)) {
            groups.remove(id);
        }
    }

    /// Runs `f` on the live group for `id`, creating the group if needed.
    /// A group that left the table while we waited on its mutex is skipped
    /// and the lookup starts over.
    fn with_group<R>(
        &self,
        id: &FrameId,
        f: impl FnOnce(&mut FrameGroup) -> R,
    ) -> (R, SharedGroup) {
        loop {
            let shared = self.lookup_or_insert(id);
            let mut group = shared.lock();

            if group.is_detached() {
                drop(group);
                self.unlink(id, &shared);
                continue;
            }
            if !self.is_live(id, &shared) {
                continue;
            }

            let result = f(&mut group);
            drop(group);
            return (result, shared);
        }
    }

    /// Routes one segment into its frame group, creating the group on first arrival.
    /// Malformed segments are dropped and reported; other frames are unaffected.
    pub fn on_segment(&self, segment: Segment) -> Result<SegmentOutcome, SegmentError> {
        let id = segment.frame_id();
        let Segment {
            channel_key,
            index,
            total,
            payload,
            ..
        } = segment;

        let (result, shared) = self.with_group(&id, |group| {
            group
                .route_segment(&channel_key, index, total, payload)
                .map(|()| group.take_completion())
        });

        match result {
            Ok(false) => {
                self.metrics.record_segment_accepted();
                Ok(SegmentOutcome::Accepted)
            }
            Ok(true) => {
                self.metrics.record_segment_accepted();
                self.metrics.record_frame_completed();
                info!("Frame {} complete", id);
                let geo = self.catalog.lookup(&id);
                self.emit(RegistryEvent::Completed(CompletedFrame {
                    id,
                    group: shared,
                    geo,
                }));
                Ok(SegmentOutcome::Completed)
            }
            Err(e) => {
                self.metrics.record_segment_rejected();
                warn!(
                    "Dropping segment {}/{} of channel {} for {}: {}",
                    index, total, channel_key, id, e
                );
                Err(e)
            }
        }
    }

    /// Sets a channel's part count from an external descriptor
    pub fn declare_channel(&self, id: &FrameId, key: impl Into<ChannelKey>, expected: u32) {
        let key = key.into();
        self.with_group(id, |group| group.declare_channel(key, expected));
    }

    /// Sweeps using the registry's own clock
    pub fn sweep_now(&self) -> SweepReport {
        self.sweep(self.clock.now())
    }

    /// Removes consumed and failed groups and applies the retry policy to stale
    /// incomplete ones. Complete groups are never dropped for age alone.
    /// Groups whose mutex is held elsewhere are left for the next pass.
    pub fn sweep(&self, now: DateTime<Utc>) -> SweepReport {
        let mut report = SweepReport::default();
        let mut events = Vec::new();
        let mut leaving = Vec::new();

        let snapshot: Vec<(FrameId, SharedGroup)> = self
            .groups
            .read()
            .iter()
            .map(|(id, shared)| (id.clone(), shared.clone()))
            .collect();

        for (id, shared) in snapshot {
            let Some(mut group) = shared.try_lock() else {
                report.skipped += 1;
                continue;
            };
            if group.is_detached() {
                continue;
            }

            let keep = self.sweep_group(&id, &mut group, now, &mut report, &mut events);
            if !keep {
                group.detach();
                drop(group);
                leaving.push((id, shared));
            }
        }

        if !leaving.is_empty() {
            let mut groups = self.groups.write();
            for (id, shared) in &leaving {
                if groups.get(id).is_some_and(|live| Arc::ptr_eq(live, shared)) {
                    groups.remove(id);
                }
            }
        }

        for event in events {
            self.emit(event);
        }
        report
    }

    /// Decides one group's fate; returns whether it stays in the table
    fn sweep_group(
        &self,
        id: &FrameId,
        group: &mut FrameGroup,
        now: DateTime<Utc>,
        report: &mut SweepReport,
        events: &mut Vec<RegistryEvent>,
    ) -> bool {
        if group.is_processed() {
            debug!("Releasing consumed frame {}", id);
            self.metrics.record_frame_consumed();
            report.consumed += 1;
            return false;
        }

        if group.failed() {
            warn!("Removing failed frame {}", id);
            self.metrics.record_frame_failed();
            report.failed += 1;
            events.push(self.eviction(group));
            return false;
        }

        if group.is_complete() || !group.timed_out(now, self.timeout) {
            report.kept += 1;
            return true;
        }

        match self.retry_policy.decide(group) {
            StaleAction::Discard => {
                warn!("Evicting empty frame {} after timeout", id);
                self.metrics.record_frame_evicted();
                report.evicted += 1;
                events.push(self.eviction(group));
                false
            }
            StaleAction::Retry => {
                group.rearm(now);
                info!(
                    "Frame {} timed out incomplete, retry {}/{}",
                    id,
                    group.retry_count(),
                    self.retry_policy.max_retries
                );
                self.metrics.record_retry_requested();
                report.retried += 1;
                report.kept += 1;
                events.push(RegistryEvent::RetryRequested(RetryRequest {
                    id: id.clone(),
                    retry_count: group.retry_count(),
                    missing: group.missing(),
                }));
                true
            }
            StaleAction::Fail => {
                group.mark_failed();
                warn!(
                    "Frame {} failed after {} retries",
                    id,
                    group.retry_count()
                );
                self.metrics.record_frame_failed();
                report.failed += 1;
                events.push(self.eviction(group));
                false
            }
        }
    }

    /// Consumer hand-back: removes a group it has finished with
    pub fn acknowledge(&self, id: &FrameId) -> Option<SharedGroup> {
        let shared = self.groups.write().remove(id)?;
        self.metrics.record_frame_consumed();
        debug!("Frame {} acknowledged", id);
        Some(shared)
    }

    /// Removes a group regardless of completeness and flags it fully processed
    pub fn force_flush(&self, id: &FrameId) -> Option<SharedGroup> {
        let shared = self.groups.write().remove(id)?;
        shared.lock().force_complete();
        info!("Frame {} force flushed", id);
        Some(shared)
    }

    /// Force flushes every live group, for shutdown
    pub fn flush_all(&self) -> Vec<SharedGroup> {
        let drained: Vec<SharedGroup> = self.groups.write().drain().map(|(_, g)| g).collect();
        for shared in &drained {
            shared.lock().force_complete();
        }
        if !drained.is_empty() {
            info!("Flushed {} frame groups", drained.len());
        }
        drained
    }

    fn eviction(&self, group: &FrameGroup) -> RegistryEvent {
        RegistryEvent::Evicted(EvictionNotice {
            id: group.id().clone(),
            summary: group.summary(),
            failed: group.failed(),
            retry_count: group.retry_count(),
        })
    }

    fn emit(&self, event: RegistryEvent) {
        if self.events.send(event).is_err() {
            debug!("No listener for registry events");
        }
    }
}
