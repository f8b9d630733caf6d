//! Operation counters for the in-process tracker (feature `metrics`).

pub mod cell;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;

pub use metrics_impl::TrackerMetrics;
pub use snapshot::TrackerMetricsSnapshot;
pub use traits::{MetricsReset, MetricsSnapshotProvider, TrackerMetricsRecorder};
