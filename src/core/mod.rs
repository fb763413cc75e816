pub mod clock;
pub mod segment;

pub use clock::{Clock, ManualClock, SystemClock};
pub use segment::{ChannelKey, FrameId, Segment};
