use thiserror::Error;

/// Reasons a segment is dropped. None of them touch the aggregator's state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentError {
    #[error("segment declares {got} parts but channel expects {expected}")]
    InconsistentTotal { expected: u32, got: u32 },

    #[error("segment index {index} out of range (0..{expected})")]
    IndexOutOfRange { index: u32, expected: u32 },

    #[error("segment {index} already received")]
    DuplicateSegment { index: u32 },

    #[error("segment declares a total of zero parts")]
    InvalidTotal,
}
