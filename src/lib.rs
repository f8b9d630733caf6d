//! warmkit: tracks the most recently touched ("warmest") key of a key/value
//! store, in process or in a remote store with atomic server-side scripts.
//!
//! ## Modules
//!
//! - [`store::ordered`]: `RwLock`-guarded hash index plus recency list.
//! - [`store::remote`]: five persisted fields rewritten by atomic procedures.
//! - [`traits`]: the [`WarmestTracker`] contract both backends implement.
//! - [`builder`]: runtime backend selection.
//! - [`ds`]: slot arena and index-linked recency list.
//! - `metrics` (feature `metrics`): lock-path counters for the in-process store.
//!
//! ```
//! use warmkit::prelude::*;
//!
//! let tracker = TrackerBuilder::new().build(Backend::InProcess);
//! tracker.put("a", 100).unwrap();
//! tracker.put("b", 200).unwrap();
//! assert_eq!(tracker.get("a").unwrap(), Some(100));
//! assert_eq!(tracker.peek_warmest().unwrap().as_deref(), Some("a"));
//! ```

pub mod builder;
pub mod ds;
pub mod error;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
pub mod store;
pub mod traits;

pub use crate::builder::{Backend, Tracker, TrackerBuilder, TrackerConfig};
pub use crate::error::{ConfigError, HostError, InvariantError, TrackerError};
#[cfg(feature = "metrics")]
pub use crate::metrics::TrackerMetricsSnapshot;
pub use crate::store::ordered::{OrderedKeyStore, RecencyCore};
pub use crate::store::remote::{FieldLayout, MemoryHost, Procedure, RemoteAtomicStore, ScriptHost};
pub use crate::traits::WarmestTracker;
