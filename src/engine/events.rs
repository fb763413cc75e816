use crate::assembly::{FrameGroup, GroupSummary};
use crate::core::FrameId;
use crate::geo::GeoReference;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Handle to a frame group; the registry drops its copy once the group leaves the table
pub type SharedGroup = Arc<Mutex<FrameGroup>>;

/// Result of routing a single segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentOutcome {
    /// Stored; the frame is still waiting for more segments
    Accepted,
    /// Stored, and this segment completed the frame
    Completed,
}

/// Fired once per frame when its last missing segment arrives
#[derive(Debug, Clone)]
pub struct CompletedFrame {
    pub id: FrameId,
    pub group: SharedGroup,
    pub geo: Option<Arc<GeoReference>>,
}

/// Fired when the sweep removes an incomplete frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvictionNotice {
    pub id: FrameId,
    pub summary: GroupSummary,
    pub failed: bool,
    pub retry_count: u32,
}

/// Fired when the sweep re-arms a partial frame; the retry driver should
/// re-request the listed segments from the demodulator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryRequest {
    pub id: FrameId,
    pub retry_count: u32,
    pub missing: Vec<(String, Vec<u32>)>,
}

#[derive(Debug, Clone)]
pub enum RegistryEvent {
    Completed(CompletedFrame),
    Evicted(EvictionNotice),
    RetryRequested(RetryRequest),
}

impl RegistryEvent {
    pub fn frame_id(&self) -> &FrameId {
        match self {
            Self::Completed(frame) => &frame.id,
            Self::Evicted(notice) => &notice.id,
            Self::RetryRequested(request) => &request.id,
        }
    }
}

/// Tally of one sweep pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub kept: usize,
    pub consumed: usize,
    pub evicted: usize,
    pub failed: usize,
    pub retried: usize,
    /// Groups locked elsewhere during the pass, left for the next one
    pub skipped: usize,
}

impl SweepReport {
    pub fn removed(&self) -> usize {
        self.consumed + self.evicted + self.failed
    }
}
