//! # In-process recency tracker
//!
//! Tracks which key was touched most recently ("warmest") using a hash index
//! plus an index-linked recency list, guarded by one coarse
//! `parking_lot::RwLock`.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                          OrderedKeyStore                             │
//!   │                                                                      │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │                  RwLock<RecencyCore>                         │   │
//!   │   └──────────────────────────────────────────────────────────────┘   │
//!   │                              │                                       │
//!   │                              ▼                                       │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │  FxHashMap<Arc<str>, SlotId>                                 │   │
//!   │   │     "a" ─────────┐   "b" ──────────┐   "c" ──────────┐       │   │
//!   │   └──────────────────┼─────────────────┼─────────────────┼───────┘   │
//!   │                      ▼                 ▼                 ▼           │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │  RecencyList<Entry>                                          │   │
//!   │   │  head ──► [a:100] ◄──► [b:200] ◄──► [c:300] ◄── tail         │   │
//!   │   │           coldest                   warmest                  │   │
//!   │   └──────────────────────────────────────────────────────────────┘   │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lock discipline
//!
//! | Method          | Lock                                            |
//! |-----------------|-------------------------------------------------|
//! | `put`           | exclusive for the whole call                    |
//! | `remove`        | exclusive for the whole call                    |
//! | `peek_warmest`  | shared                                          |
//! | `get`           | shared, then (only if promotion is needed) released and exclusive |
//!
//! ## `get` fast and slow paths
//!
//! ```text
//!   read lock ── lookup ──┬── absent ─────────────────────────► None
//!                         ├── is tail ── read value ── unlock ► Some(v)
//!                         └── colder ── unlock
//!                                        │
//!   write lock ── lookup again ──┬── absent (removed meanwhile) ► None
//!                                ├── is tail (promoted meanwhile) ► Some(v)
//!                                └── colder ── move to tail ──► Some(v)
//! ```
//!
//! The fast path reads the value before dropping the shared guard. Reading
//! after the guard drops would race a concurrent `put` on the same key.
//! The slow path never reuses anything observed under the shared guard: the
//! lock is released and reacquired, so the key may have been removed or
//! promoted in between.
//!
//! A shared guard is never held while waiting for the exclusive one, so the
//! upgrade cannot deadlock against another upgrading reader.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::ds::{RecencyList, SlotId};
use crate::error::{InvariantError, TrackerError};
#[cfg(feature = "metrics")]
use crate::metrics::{
    MetricsReset, MetricsSnapshotProvider, TrackerMetrics, TrackerMetricsRecorder,
    TrackerMetricsSnapshot,
};
use crate::traits::WarmestTracker;

/// List payload: the key is shared with the index so each key is allocated once.
#[derive(Debug)]
struct Entry {
    key: Arc<str>,
    value: i64,
}

/// Where a key sits, observed without mutating anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Absent,
    /// The key is the tail; carries its value.
    Warmest(i64),
    /// The key is present but not the tail.
    Colder,
}

/// Result of promoting a key to warmest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Promotion {
    Absent,
    /// The key was already the tail; no links changed.
    AlreadyWarmest(i64),
    /// The key was moved to the tail.
    Promoted(i64),
}

impl Promotion {
    /// Value returned to the caller of `get`.
    #[inline]
    pub fn value(self) -> Option<i64> {
        match self {
            Promotion::Absent => None,
            Promotion::AlreadyWarmest(value) | Promotion::Promoted(value) => Some(value),
        }
    }
}

/// Result of `put`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Inserted,
    Updated { previous: i64, promoted: bool },
}

impl PutOutcome {
    #[inline]
    pub fn previous(self) -> Option<i64> {
        match self {
            PutOutcome::Inserted => None,
            PutOutcome::Updated { previous, .. } => Some(previous),
        }
    }
}

/// Single-threaded recency tracker.
///
/// All mutation takes `&mut self`; [`OrderedKeyStore`] wraps it in a lock for
/// concurrent use. Every operation is O(1) except [`keys_by_recency`] and
/// [`check_invariants`].
///
/// # Example
///
/// ```
/// use warmkit::store::ordered::RecencyCore;
///
/// let mut core = RecencyCore::new();
/// core.put("a", 1);
/// core.put("b", 2);
/// assert_eq!(core.warmest(), Some("b"));
///
/// assert_eq!(core.get("a"), Some(1));
/// assert_eq!(core.warmest(), Some("a"));
/// assert_eq!(core.coldest(), Some("b"));
/// ```
///
/// [`keys_by_recency`]: RecencyCore::keys_by_recency
/// [`check_invariants`]: RecencyCore::check_invariants
pub struct RecencyCore {
    index: FxHashMap<Arc<str>, SlotId>,
    list: RecencyList<Entry>,
}

impl RecencyCore {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Pre-sizes the index and the node arena for `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            list: RecencyList::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns `true` if `key` is present. Does not promote.
    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Most recently touched key.
    #[inline]
    pub fn warmest(&self) -> Option<&str> {
        self.list.back().map(|entry| &*entry.key)
    }

    /// Least recently touched key.
    #[inline]
    pub fn coldest(&self) -> Option<&str> {
        self.list.front().map(|entry| &*entry.key)
    }

    /// Classifies `key` without touching the list.
    #[inline]
    pub fn probe(&self, key: &str) -> Probe {
        let Some(&id) = self.index.get(key) else {
            return Probe::Absent;
        };
        if self.list.is_back(id) {
            Probe::Warmest(self.entry(id).value)
        } else {
            Probe::Colder
        }
    }

    /// Inserts or updates `key` and makes it warmest. Returns the previous value.
    #[inline]
    pub fn put(&mut self, key: &str, value: i64) -> Option<i64> {
        self.put_detailed(key, value).previous()
    }

    /// Like [`put`](Self::put) but reports whether the key was new and
    /// whether links were rewired.
    pub fn put_detailed(&mut self, key: &str, value: i64) -> PutOutcome {
        if let Some(&id) = self.index.get(key) {
            let previous = std::mem::replace(&mut self.entry_mut(id).value, value);
            let promoted = !self.list.is_back(id);
            if promoted {
                self.list.move_to_back(id);
            }
            self.debug_validate_invariants();
            return PutOutcome::Updated { previous, promoted };
        }

        let key: Arc<str> = Arc::from(key);
        let id = self.list.push_back(Entry {
            key: Arc::clone(&key),
            value,
        });
        self.index.insert(key, id);
        self.debug_validate_invariants();
        PutOutcome::Inserted
    }

    /// Returns the value of `key` and makes it warmest.
    #[inline]
    pub fn get(&mut self, key: &str) -> Option<i64> {
        self.promote(key).value()
    }

    /// Moves `key` to the tail unless it is already there.
    pub fn promote(&mut self, key: &str) -> Promotion {
        let Some(&id) = self.index.get(key) else {
            return Promotion::Absent;
        };
        let value = self.entry(id).value;
        if self.list.is_back(id) {
            return Promotion::AlreadyWarmest(value);
        }
        self.list.move_to_back(id);
        self.debug_validate_invariants();
        Promotion::Promoted(value)
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<i64> {
        let id = self.index.remove(key)?;
        let entry = self
            .list
            .remove(id)
            .unwrap_or_else(|| panic!("index maps {key:?} to freed slot {}", id.index()));
        self.debug_validate_invariants();
        Some(entry.value)
    }

    /// Drops every key.
    pub fn clear(&mut self) {
        self.index.clear();
        self.list.clear();
    }

    /// Keys from coldest to warmest.
    pub fn keys_by_recency(&self) -> impl Iterator<Item = &str> {
        self.list.iter().map(|entry| &*entry.key)
    }

    /// Checks that the index and the list describe the same key set and that
    /// every list link is consistent.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.list.check_invariants()?;
        if self.index.len() != self.list.len() {
            return Err(InvariantError::new(format!(
                "index holds {} keys but list holds {} nodes",
                self.index.len(),
                self.list.len()
            )));
        }
        for (key, &id) in &self.index {
            match self.list.get(id) {
                Some(entry) if entry.key == *key => {},
                Some(entry) => {
                    return Err(InvariantError::new(format!(
                        "index maps {key:?} to node holding {:?}",
                        entry.key
                    )));
                },
                None => {
                    return Err(InvariantError::new(format!(
                        "index maps {key:?} to freed slot {}",
                        id.index()
                    )));
                },
            }
        }
        Ok(())
    }

    #[inline]
    fn debug_validate_invariants(&self) {
        if cfg!(debug_assertions) {
            if let Err(err) = self.check_invariants() {
                panic!("recency invariant violated: {err}");
            }
        }
    }

    fn entry(&self, id: SlotId) -> &Entry {
        match self.list.get(id) {
            Some(entry) => entry,
            None => panic!("index points at freed slot {}", id.index()),
        }
    }

    fn entry_mut(&mut self, id: SlotId) -> &mut Entry {
        match self.list.get_mut(id) {
            Some(entry) => entry,
            None => panic!("index points at freed slot {}", id.index()),
        }
    }
}

impl Default for RecencyCore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RecencyCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecencyCore")
            .field("len", &self.len())
            .field("coldest", &self.coldest())
            .field("warmest", &self.warmest())
            .finish()
    }
}

impl<S: AsRef<str>> Extend<(S, i64)> for RecencyCore {
    fn extend<I: IntoIterator<Item = (S, i64)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.put(key.as_ref(), value);
        }
    }
}

/// Thread-safe recency tracker.
///
/// Share it behind an `Arc`; every method takes `&self`.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::thread;
/// use warmkit::store::ordered::OrderedKeyStore;
///
/// let store = Arc::new(OrderedKeyStore::new());
/// store.put("a", 100);
/// store.put("b", 200);
///
/// let reader = Arc::clone(&store);
/// thread::spawn(move || assert_eq!(reader.get("a"), Some(100)))
///     .join()
///     .unwrap();
///
/// assert_eq!(store.peek_warmest().as_deref(), Some("a"));
/// ```
pub struct OrderedKeyStore {
    inner: RwLock<RecencyCore>,
    #[cfg(feature = "metrics")]
    metrics: TrackerMetrics,
}

impl OrderedKeyStore {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(RecencyCore::with_capacity(capacity)),
            #[cfg(feature = "metrics")]
            metrics: TrackerMetrics::default(),
        }
    }

    /// Inserts or updates `key` and makes it warmest. Returns the previous value.
    pub fn put(&self, key: &str, value: i64) -> Option<i64> {
        let outcome = self.inner.write().put_detailed(key, value);

        #[cfg(feature = "metrics")]
        match outcome {
            PutOutcome::Inserted => self.metrics.record_put_new(),
            PutOutcome::Updated { promoted, .. } => {
                self.metrics.record_put_update();
                if promoted {
                    self.metrics.record_promotion();
                }
            },
        }

        outcome.previous()
    }

    /// Returns the value of `key` and promotes it to warmest.
    ///
    /// Takes the exclusive lock only when the key exists and is not already
    /// warmest.
    pub fn get(&self, key: &str) -> Option<i64> {
        #[cfg(feature = "metrics")]
        self.metrics.record_get_call();

        {
            let core = self.inner.read();
            match core.probe(key) {
                Probe::Absent => {
                    #[cfg(feature = "metrics")]
                    self.metrics.record_get_miss();
                    return None;
                },
                // value was copied out while `core` still guards it
                Probe::Warmest(value) => {
                    #[cfg(feature = "metrics")]
                    self.metrics.record_fast_path_hit();
                    return Some(value);
                },
                Probe::Colder => {},
            }
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_slow_path_entry();

        let promotion = self.inner.write().promote(key);
        match promotion {
            Promotion::Absent => {
                trace!(key, "get: key removed before promotion");
                #[cfg(feature = "metrics")]
                self.metrics.record_slow_path_vanished();
                #[cfg(feature = "metrics")]
                self.metrics.record_get_miss();
            },
            Promotion::AlreadyWarmest(_) => {
                trace!(key, "get: key promoted by a concurrent caller");
                #[cfg(feature = "metrics")]
                self.metrics.record_slow_path_already_warmest();
            },
            Promotion::Promoted(_) => {
                trace!(key, "get: promoted to warmest");
                #[cfg(feature = "metrics")]
                self.metrics.record_promotion();
            },
        }
        promotion.value()
    }

    /// Removes `key`, returning its value.
    pub fn remove(&self, key: &str) -> Option<i64> {
        let removed = self.inner.write().remove(key);
        #[cfg(feature = "metrics")]
        if removed.is_some() {
            self.metrics.record_remove_hit();
        } else {
            self.metrics.record_remove_miss();
        }
        removed
    }

    /// Most recently touched key.
    pub fn peek_warmest(&self) -> Option<String> {
        self.inner.read().warmest().map(str::to_owned)
    }

    /// Least recently touched key.
    pub fn peek_coldest(&self) -> Option<String> {
        self.inner.read().coldest().map(str::to_owned)
    }

    /// Returns `true` if `key` is present. Does not promote.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.read().contains(key)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Snapshot of keys from coldest to warmest.
    pub fn keys_by_recency(&self) -> Vec<String> {
        self.inner
            .read()
            .keys_by_recency()
            .map(str::to_owned)
            .collect()
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// Checks structural invariants under the shared lock.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.inner.read().check_invariants()
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> TrackerMetricsSnapshot {
        self.metrics.snapshot(self.len())
    }
}

impl Default for OrderedKeyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for OrderedKeyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.inner.read();
        f.debug_struct("OrderedKeyStore")
            .field("len", &core.len())
            .field("warmest", &core.warmest())
            .finish()
    }
}

impl WarmestTracker for OrderedKeyStore {
    #[inline]
    fn put(&self, key: &str, value: i64) -> Result<Option<i64>, TrackerError> {
        Ok(OrderedKeyStore::put(self, key, value))
    }

    #[inline]
    fn get(&self, key: &str) -> Result<Option<i64>, TrackerError> {
        Ok(OrderedKeyStore::get(self, key))
    }

    #[inline]
    fn remove(&self, key: &str) -> Result<Option<i64>, TrackerError> {
        Ok(OrderedKeyStore::remove(self, key))
    }

    #[inline]
    fn peek_warmest(&self) -> Result<Option<String>, TrackerError> {
        Ok(OrderedKeyStore::peek_warmest(self))
    }
}

#[cfg(feature = "metrics")]
impl MetricsSnapshotProvider<TrackerMetricsSnapshot> for OrderedKeyStore {
    fn snapshot(&self) -> TrackerMetricsSnapshot {
        self.metrics_snapshot()
    }
}

#[cfg(feature = "metrics")]
impl MetricsReset for OrderedKeyStore {
    fn reset_metrics(&self) {
        self.metrics.reset_metrics();
    }
}
