use super::SegmentSource;
use crate::core::Segment;
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Source fed by any number of producers through a tokio channel.
/// Ends once every sender has been dropped.
pub struct ChannelSource {
    rx: mpsc::Receiver<Segment>,
}

impl ChannelSource {
    pub fn new(capacity: usize) -> (mpsc::Sender<Segment>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self { rx })
    }

    pub fn from_receiver(rx: mpsc::Receiver<Segment>) -> Self {
        Self { rx }
    }
}

#[async_trait]
impl SegmentSource for ChannelSource {
    async fn next_segment(&mut self) -> Result<Option<Segment>> {
        Ok(self.rx.recv().await)
    }
}
