//! # Tracker Contract
//!
//! [`WarmestTracker`] is the four-operation contract every backend
//! implements identically. Callers (an HTTP surface, a CLI, a test) depend
//! only on this trait and never on a concrete backend.
//!
//! ```text
//!                      ┌──────────────────────────────────────┐
//!                      │          WarmestTracker              │
//!                      │                                      │
//!                      │  put(&, &str, i64)  → Option<i64>    │
//!                      │  get(&, &str)       → Option<i64>    │
//!                      │  remove(&, &str)    → Option<i64>    │
//!                      │  peek_warmest(&)    → Option<String> │
//!                      └──────────────────┬───────────────────┘
//!                                         │
//!                ┌────────────────────────┴────────────────────────┐
//!                ▼                                                 ▼
//!   ┌────────────────────────────┐                  ┌────────────────────────────┐
//!   │      OrderedKeyStore       │                  │   RemoteAtomicStore<H>     │
//!   │  RwLock + fast/slow path   │                  │  one atomic script per op  │
//!   │  never returns Err         │                  │  Err on host failure       │
//!   └────────────────────────────┘                  └────────────────────────────┘
//! ```
//!
//! ## Result conventions
//!
//! | Outcome                   | Representation                          |
//! |---------------------------|-----------------------------------------|
//! | key present               | `Ok(Some(value))`                       |
//! | key absent                | `Ok(None)`                              |
//! | remote store unreachable  | `Err(TrackerError::Unavailable { .. })` |
//! | host refused the call     | `Err(TrackerError::Rejected { .. })`    |
//! | undecodable remote reply  | `Err(TrackerError::MalformedReply {..})`|
//!
//! Operations are never retried internally.
//!
//! ## Example
//!
//! ```
//! use warmkit::store::ordered::OrderedKeyStore;
//! use warmkit::traits::WarmestTracker;
//!
//! fn touch_all<T: WarmestTracker>(tracker: &T, keys: &[&str]) {
//!     for key in keys {
//!         let _ = tracker.get(key);
//!     }
//! }
//!
//! let store = OrderedKeyStore::new();
//! store.put("a", 1);
//! store.put("b", 2);
//! touch_all(&store, &["a"]);
//! assert_eq!(WarmestTracker::peek_warmest(&store).unwrap().as_deref(), Some("a"));
//! ```

use std::sync::Arc;

use crate::error::TrackerError;

/// Recency tracker contract shared by the in-process and remote backends.
///
/// Implementations must be safe to call from many threads at once and must
/// return identical results for identical call sequences.
pub trait WarmestTracker: Send + Sync {
    /// Inserts or updates `key`, making it warmest.
    ///
    /// Returns the previous value, or `None` if the key was new.
    fn put(&self, key: &str, value: i64) -> Result<Option<i64>, TrackerError>;

    /// Returns the value of `key` and promotes it to warmest.
    fn get(&self, key: &str) -> Result<Option<i64>, TrackerError>;

    /// Removes `key`, returning the value it held.
    fn remove(&self, key: &str) -> Result<Option<i64>, TrackerError>;

    /// Returns the most recently touched key that is still present.
    fn peek_warmest(&self) -> Result<Option<String>, TrackerError>;
}

impl<T> WarmestTracker for Arc<T>
where
    T: WarmestTracker + ?Sized,
{
    #[inline]
    fn put(&self, key: &str, value: i64) -> Result<Option<i64>, TrackerError> {
        (**self).put(key, value)
    }

    #[inline]
    fn get(&self, key: &str) -> Result<Option<i64>, TrackerError> {
        (**self).get(key)
    }

    #[inline]
    fn remove(&self, key: &str) -> Result<Option<i64>, TrackerError> {
        (**self).remove(key)
    }

    #[inline]
    fn peek_warmest(&self) -> Result<Option<String>, TrackerError> {
        (**self).peek_warmest()
    }
}
