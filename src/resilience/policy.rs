use crate::assembly::FrameGroup;
use serde::{Deserialize, Serialize};

/// What the sweep does with a timed-out, incomplete group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaleAction {
    /// Nothing was ever accepted; drop it quietly
    Discard,

    /// Open another accumulation window and ask for the missing segments
    Retry,

    /// Retries exhausted; mark failed and drop
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_retries: u32,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Never re-arm; partial groups fail on their first timeout
    pub fn never() -> Self {
        Self { max_retries: 0 }
    }

    pub fn decide(&self, group: &FrameGroup) -> StaleAction {
        if !group.has_data() {
            StaleAction::Discard
        } else if group.retry_count() < self.max_retries {
            StaleAction::Retry
        } else {
            StaleAction::Fail
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 1 }
    }
}
