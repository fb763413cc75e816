pub mod aggregator;
pub mod error;
pub mod group;

pub use aggregator::{ChannelAggregator, ChannelSummary};
pub use error::SegmentError;
pub use group::{
    FrameGroup, GroupState, GroupSummary, ProcessingFlag, ProcessingFlags,
    DEFAULT_TIMEOUT_SECONDS,
};
