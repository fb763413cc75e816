use super::SegmentSource;
use crate::core::Segment;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::VecDeque;

/// Replays a recorded list of segments, then ends
pub struct ReplaySource {
    segments: VecDeque<Segment>,
    delivered: u64,
}

impl ReplaySource {
    pub fn new(segments: impl IntoIterator<Item = Segment>) -> Self {
        Self {
            segments: segments.into_iter().collect(),
            delivered: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.segments.len()
    }

    pub fn delivered(&self) -> u64 {
        self.delivered
    }
}

#[async_trait]
impl SegmentSource for ReplaySource {
    async fn next_segment(&mut self) -> Result<Option<Segment>> {
        let segment = self.segments.pop_front();
        if segment.is_some() {
            self.delivered += 1;
        }
        Ok(segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FrameId;
    use chrono::Utc;

    #[test]
    fn test_replay_counts_delivered_segments() {
        let id = FrameId::new("GOES-13", "Full Disk", Utc::now());
        let mut source = ReplaySource::new(vec![
            Segment::new(&id, "VIS", 0, 2, vec![0u8]),
            Segment::new(&id, "VIS", 1, 2, vec![1u8]),
        ]);

        tokio_test::block_on(async {
            assert_eq!(source.next_segment().await.unwrap().unwrap().index, 0);
            assert_eq!(source.next_segment().await.unwrap().unwrap().index, 1);
            assert!(source.next_segment().await.unwrap().is_none());
        });
        assert_eq!(source.delivered(), 2);
        assert_eq!(source.remaining(), 0);
    }
}
