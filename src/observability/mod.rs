pub mod metrics;
pub mod monitor;

pub use metrics::{AssemblyMetrics, MetricsSnapshot};
pub use monitor::AssemblyMonitor;
