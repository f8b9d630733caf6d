pub use crate::builder::{Backend, Tracker, TrackerBuilder, TrackerConfig};
pub use crate::error::{ConfigError, HostError, InvariantError, TrackerError};
#[cfg(feature = "metrics")]
pub use crate::metrics::{MetricsReset, MetricsSnapshotProvider, TrackerMetricsSnapshot};
pub use crate::store::ordered::{OrderedKeyStore, RecencyCore};
pub use crate::store::remote::{FieldLayout, MemoryHost, Procedure, RemoteAtomicStore, ScriptHost};
pub use crate::traits::WarmestTracker;
