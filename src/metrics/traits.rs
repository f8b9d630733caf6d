//! # Metrics Traits
//!
//! Recording and reading are split the same way the tracker splits shared
//! and exclusive access: the store records through [`TrackerMetricsRecorder`]
//! from either side of its lock, and callers read through
//! [`MetricsSnapshotProvider`].
//!
//! ```text
//!   OrderedKeyStore ──record_*──► TrackerMetricsRecorder (atomics, &self)
//!          │
//!          └──snapshot()───────► MetricsSnapshotProvider<TrackerMetricsSnapshot>
//! ```

/// Counters for the tracker operations and the `get` fast/slow paths.
///
/// All methods take `&self` because `get` records while holding only the
/// shared lock.
pub trait TrackerMetricsRecorder {
    fn record_get_call(&self);
    fn record_get_miss(&self);
    fn record_fast_path_hit(&self);
    fn record_slow_path_entry(&self);
    fn record_slow_path_vanished(&self);
    fn record_slow_path_already_warmest(&self);
    fn record_promotion(&self);
    fn record_put_new(&self);
    fn record_put_update(&self);
    fn record_remove_hit(&self);
    fn record_remove_miss(&self);
}

/// Read a point-in-time copy of the counters.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Reset metrics between tests or benchmark iterations.
pub trait MetricsReset {
    fn reset_metrics(&self);
}
