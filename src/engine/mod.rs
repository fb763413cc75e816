pub mod events;
pub mod ingest;
pub mod registry;
pub mod sweeper;

pub use events::{
    CompletedFrame, EvictionNotice, RegistryEvent, RetryRequest, SegmentOutcome, SharedGroup,
    SweepReport,
};
pub use ingest::{IngestReport, IngestService};
pub use registry::GroupRegistry;
pub use sweeper::Sweeper;
