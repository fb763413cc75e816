use super::{ChannelAggregator, ChannelSummary, SegmentError};
use crate::core::{ChannelKey, FrameId};
use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Default time a frame may stay incomplete before the sweep acts on it
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 2 * 3600;

/// Derived products the consumer reports back once it has handled them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessingFlag {
    Processed,
    FalseColor,
    Visible,
    Infrared,
    WaterVapour,
    OtherData,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingFlags {
    pub processed: bool,
    pub false_color: bool,
    pub visible: bool,
    pub infrared: bool,
    pub water_vapour: bool,
    pub other_data: bool,
}

impl ProcessingFlags {
    pub fn set(&mut self, flag: ProcessingFlag) {
        match flag {
            ProcessingFlag::Processed => self.processed = true,
            ProcessingFlag::FalseColor => self.false_color = true,
            ProcessingFlag::Visible => self.visible = true,
            ProcessingFlag::Infrared => self.infrared = true,
            ProcessingFlag::WaterVapour => self.water_vapour = true,
            ProcessingFlag::OtherData => self.other_data = true,
        }
    }

    pub fn all(&self) -> bool {
        self.processed
            && self.false_color
            && self.visible
            && self.infrared
            && self.water_vapour
            && self.other_data
    }
}

/// Lifecycle position of a frame group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupState {
    Empty,
    Accumulating,
    Complete,
    Consumed,
    TimedOut,
    Failed,
}

impl GroupState {
    pub fn name(&self) -> &str {
        match self {
            Self::Empty => "Empty",
            Self::Accumulating => "Accumulating",
            Self::Complete => "Complete",
            Self::Consumed => "Consumed",
            Self::TimedOut => "TimedOut",
            Self::Failed => "Failed",
        }
    }
}

/// Partial-completeness snapshot of a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub id: FrameId,
    pub visible: ChannelSummary,
    pub infrared: ChannelSummary,
    pub water_vapour: ChannelSummary,
    pub other: BTreeMap<String, ChannelSummary>,
    pub other_complete: bool,
    pub complete: bool,
}

fn completeness(complete: bool) -> &'static str {
    if complete {
        "Complete"
    } else {
        "Incomplete"
    }
}

impl fmt::Display for GroupSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Satellite Name: {}", self.id.satellite)?;
        writeln!(f, "Region Name: {}", self.id.region)?;
        writeln!(f, "Frame Time: {}", self.id.frame_time)?;
        for (label, channel) in [
            ("Visible", &self.visible),
            ("Infrared", &self.infrared),
            ("Water Vapour", &self.water_vapour),
        ] {
            writeln!(
                f,
                "{} Segments: {} ({})",
                label,
                channel.received,
                completeness(channel.complete)
            )?;
        }
        writeln!(
            f,
            "Other Data {} ({})",
            self.other.len(),
            completeness(self.other_complete)
        )
    }
}

/// All channels of one frame plus its processing and retry bookkeeping
#[derive(Debug, Clone)]
pub struct FrameGroup {
    id: FrameId,
    visible: ChannelAggregator,
    infrared: ChannelAggregator,
    water_vapour: ChannelAggregator,
    other: HashMap<String, ChannelAggregator>,

    /// Set by the consumer once it has acted on the frame
    pub flags: ProcessingFlags,

    /// Passed through to the exporter untouched
    pub crop_image: bool,

    retry_count: u32,
    failed: bool,
    created: DateTime<Utc>,
    armed_at: DateTime<Utc>,
    completion_reported: bool,
    detached: bool,
}

impl FrameGroup {
    pub fn new(id: FrameId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            visible: ChannelAggregator::new(),
            infrared: ChannelAggregator::new(),
            water_vapour: ChannelAggregator::new(),
            other: HashMap::new(),
            flags: ProcessingFlags::default(),
            crop_image: false,
            retry_count: 0,
            failed: false,
            created: now,
            armed_at: now,
            completion_reported: false,
            detached: false,
        }
    }

    pub fn id(&self) -> &FrameId {
        &self.id
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    /// Start of the current accumulation window
    pub fn armed_at(&self) -> DateTime<Utc> {
        self.armed_at
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Terminal: the group will be removed by the next sweep
    pub fn mark_failed(&mut self) {
        self.failed = true;
    }

    pub fn mark_processed(&mut self, flag: ProcessingFlag) {
        self.flags.set(flag);
    }

    pub fn is_processed(&self) -> bool {
        self.flags.processed
    }

    pub fn visible(&self) -> &ChannelAggregator {
        &self.visible
    }

    pub fn infrared(&self) -> &ChannelAggregator {
        &self.infrared
    }

    pub fn water_vapour(&self) -> &ChannelAggregator {
        &self.water_vapour
    }

    pub fn other(&self) -> &HashMap<String, ChannelAggregator> {
        &self.other
    }

    pub fn channel(&self, key: &ChannelKey) -> Option<&ChannelAggregator> {
        match key {
            ChannelKey::Visible => Some(&self.visible),
            ChannelKey::Infrared => Some(&self.infrared),
            ChannelKey::WaterVapour => Some(&self.water_vapour),
            ChannelKey::Other(name) => self.other.get(name),
        }
    }

    fn channel_mut(&mut self, key: ChannelKey) -> &mut ChannelAggregator {
        match key {
            ChannelKey::Visible => &mut self.visible,
            ChannelKey::Infrared => &mut self.infrared,
            ChannelKey::WaterVapour => &mut self.water_vapour,
            ChannelKey::Other(name) => self.other.entry(name).or_default(),
        }
    }

    /// Declare a channel's part count before any of its segments arrive.
    /// Has no effect on a channel that already knows its count.
    pub fn declare_channel(&mut self, key: impl Into<ChannelKey>, expected: u32) {
        let channel = self.channel_mut(key.into());
        if channel.expected().is_none() && channel.is_empty() {
            *channel = ChannelAggregator::with_expected(expected);
        }
    }

    pub fn route_segment(
        &mut self,
        channel_key: &str,
        index: u32,
        total: u32,
        payload: Bytes,
    ) -> Result<(), SegmentError> {
        match ChannelKey::from(channel_key) {
            // An auxiliary channel only exists once it has accepted a segment
            ChannelKey::Other(name) if !self.other.contains_key(&name) => {
                let mut channel = ChannelAggregator::new();
                channel.add_segment(index, total, payload)?;
                self.other.insert(name, channel);
                Ok(())
            }
            key => self.channel_mut(key).add_segment(index, total, payload),
        }
    }

    pub fn other_data_is_complete(&self) -> bool {
        self.other.values().all(ChannelAggregator::is_complete)
    }

    pub fn is_complete(&self) -> bool {
        self.visible.is_complete()
            && self.infrared.is_complete()
            && self.water_vapour.is_complete()
            && self.other_data_is_complete()
    }

    pub fn has_data(&self) -> bool {
        !self.visible.is_empty()
            || !self.infrared.is_empty()
            || !self.water_vapour.is_empty()
            || self.other.values().any(|channel| !channel.is_empty())
    }

    pub fn timed_out(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        now - self.armed_at > timeout
    }

    /// Flags every derived product as handled; channel data is left as is
    pub fn force_complete(&mut self) {
        self.flags = ProcessingFlags {
            processed: true,
            false_color: true,
            visible: true,
            infrared: true,
            water_vapour: true,
            other_data: true,
        };
    }

    pub fn state(&self, now: DateTime<Utc>, timeout: Duration) -> GroupState {
        if self.failed {
            GroupState::Failed
        } else if self.is_processed() {
            GroupState::Consumed
        } else if self.is_complete() {
            GroupState::Complete
        } else if self.timed_out(now, timeout) {
            GroupState::TimedOut
        } else if self.has_data() {
            GroupState::Accumulating
        } else {
            GroupState::Empty
        }
    }

    /// Returns true exactly once: the first time it is called on a complete group
    pub(crate) fn take_completion(&mut self) -> bool {
        if self.completion_reported || !self.is_complete() {
            return false;
        }
        self.completion_reported = true;
        true
    }

    /// Marks the group as leaving the registry; later arrivals go to a new group
    pub(crate) fn detach(&mut self) {
        self.detached = true;
    }

    pub(crate) fn is_detached(&self) -> bool {
        self.detached
    }

    /// Opens a fresh accumulation window for another retry round
    pub(crate) fn rearm(&mut self, now: DateTime<Utc>) {
        self.retry_count += 1;
        self.armed_at = now;
    }

    /// Outstanding indices per channel, fixed channels first
    pub fn missing(&self) -> Vec<(String, Vec<u32>)> {
        let fixed = [
            (ChannelKey::Visible, &self.visible),
            (ChannelKey::Infrared, &self.infrared),
            (ChannelKey::WaterVapour, &self.water_vapour),
        ];
        let mut other: Vec<_> = self.other.iter().collect();
        other.sort_by(|a, b| a.0.cmp(b.0));

        fixed
            .into_iter()
            .map(|(key, channel)| (key.name().to_string(), channel))
            .chain(other.into_iter().map(|(name, channel)| (name.clone(), channel)))
            .filter(|(_, channel)| !channel.is_complete())
            .map(|(name, channel)| (name, channel.missing()))
            .collect()
    }

    pub fn summary(&self) -> GroupSummary {
        GroupSummary {
            id: self.id.clone(),
            visible: self.visible.summary(),
            infrared: self.infrared.summary(),
            water_vapour: self.water_vapour.summary(),
            other: self
                .other
                .iter()
                .map(|(name, channel)| (name.clone(), channel.summary()))
                .collect(),
            other_complete: self.other_data_is_complete(),
            complete: self.is_complete(),
        }
    }
}
