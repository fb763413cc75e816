pub mod channel;
pub mod replay;

use crate::core::Segment;
use anyhow::Result;
use async_trait::async_trait;

pub use channel::ChannelSource;
pub use replay::ReplaySource;

/// Feed of segments coming off the demodulator
#[async_trait]
pub trait SegmentSource: Send {
    /// Next segment, or `None` once the feed has ended
    async fn next_segment(&mut self) -> Result<Option<Segment>>;
}
