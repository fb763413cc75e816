use super::SegmentError;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Arrival state of one channel, as reported in notifications
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub received: usize,
    pub expected: Option<u32>,
    pub complete: bool,
}

/// Collects the segments of a single channel of a single frame
#[derive(Debug, Clone, Default)]
pub struct ChannelAggregator {
    expected: Option<u32>,
    segments: BTreeMap<u32, Bytes>,
}

impl ChannelAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregator whose part count comes from an external channel descriptor
    pub fn with_expected(expected: u32) -> Self {
        Self {
            expected: Some(expected),
            segments: BTreeMap::new(),
        }
    }

    pub fn add_segment(
        &mut self,
        index: u32,
        total: u32,
        payload: Bytes,
    ) -> Result<(), SegmentError> {
        if total == 0 {
            return Err(SegmentError::InvalidTotal);
        }

        let expected = match self.expected {
            Some(expected) if expected != total => {
                return Err(SegmentError::InconsistentTotal {
                    expected,
                    got: total,
                });
            }
            Some(expected) => expected,
            None => total,
        };

        if index >= expected {
            return Err(SegmentError::IndexOutOfRange { index, expected });
        }
        if self.segments.contains_key(&index) {
            return Err(SegmentError::DuplicateSegment { index });
        }

        self.expected = Some(expected);
        self.segments.insert(index, payload);
        Ok(())
    }

    pub fn expected(&self) -> Option<u32> {
        self.expected
    }

    pub fn received(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.expected
            .map(|expected| self.segments.len() == expected as usize)
            .unwrap_or(false)
    }

    /// Arrived payloads in ascending index order
    pub fn payloads(&self) -> impl Iterator<Item = (u32, &Bytes)> + '_ {
        self.segments.iter().map(|(index, payload)| (*index, payload))
    }

    /// Indices still outstanding. Empty while the part count is unknown.
    pub fn missing(&self) -> Vec<u32> {
        let Some(expected) = self.expected else {
            return Vec::new();
        };
        (0..expected)
            .filter(|index| !self.segments.contains_key(index))
            .collect()
    }

    pub fn summary(&self) -> ChannelSummary {
        ChannelSummary {
            received: self.received(),
            expected: self.expected,
            complete: self.is_complete(),
        }
    }
}
