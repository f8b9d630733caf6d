//! Unified tracker builder for both backends.
//!
//! Hides which backend sits behind a tracker so callers can pick one at
//! startup (from a flag, an environment variable, a config file) and hold a
//! single [`Tracker`] type afterwards.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use warmkit::builder::{Backend, TrackerBuilder};
//! use warmkit::store::remote::MemoryHost;
//! use warmkit::traits::WarmestTracker;
//!
//! let local = TrackerBuilder::new().initial_capacity(64).build(Backend::InProcess);
//! let remote = TrackerBuilder::new()
//!     .namespace("{sessions}")
//!     .build(Backend::Remote(Arc::new(MemoryHost::new())));
//!
//! for tracker in [&local, &remote] {
//!     tracker.put("a", 1).unwrap();
//!     tracker.put("b", 2).unwrap();
//!     tracker.get("a").unwrap();
//!     assert_eq!(tracker.peek_warmest().unwrap().as_deref(), Some("a"));
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use crate::error::{ConfigError, TrackerError};
use crate::store::ordered::OrderedKeyStore;
use crate::store::remote::{FieldLayout, RemoteAtomicStore, ScriptHost};
use crate::traits::WarmestTracker;

/// Where tracker state lives.
#[derive(Clone)]
pub enum Backend {
    /// In this process, behind a reader/writer lock.
    InProcess,
    /// In an external store reached through a script host.
    Remote(Arc<dyn ScriptHost>),
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::InProcess => f.write_str("InProcess"),
            Backend::Remote(_) => f.write_str("Remote(..)"),
        }
    }
}

/// Settings shared by both backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Slots preallocated by the in-process backend. Ignored by the remote one.
    pub initial_capacity: usize,
    /// Prefix of the remote field names. Ignored by the in-process backend
    /// but still validated.
    pub namespace: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 0,
            namespace: FieldLayout::DEFAULT_NAMESPACE.to_owned(),
        }
    }
}

/// Tracker with the backend chosen at runtime.
pub struct Tracker {
    inner: TrackerInner,
}

enum TrackerInner {
    InProcess(OrderedKeyStore),
    Remote(RemoteAtomicStore),
}

impl Tracker {
    /// Returns the in-process store, if that is the backend.
    pub fn as_in_process(&self) -> Option<&OrderedKeyStore> {
        match &self.inner {
            TrackerInner::InProcess(store) => Some(store),
            TrackerInner::Remote(_) => None,
        }
    }

    /// Returns the remote store, if that is the backend.
    pub fn as_remote(&self) -> Option<&RemoteAtomicStore> {
        match &self.inner {
            TrackerInner::InProcess(_) => None,
            TrackerInner::Remote(store) => Some(store),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self.inner, TrackerInner::Remote(_))
    }
}

impl fmt::Debug for Tracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            TrackerInner::InProcess(store) => f.debug_tuple("Tracker").field(store).finish(),
            TrackerInner::Remote(store) => f.debug_tuple("Tracker").field(store).finish(),
        }
    }
}

impl WarmestTracker for Tracker {
    fn put(&self, key: &str, value: i64) -> Result<Option<i64>, TrackerError> {
        match &self.inner {
            TrackerInner::InProcess(store) => Ok(store.put(key, value)),
            TrackerInner::Remote(store) => store.put(key, value),
        }
    }

    fn get(&self, key: &str) -> Result<Option<i64>, TrackerError> {
        match &self.inner {
            TrackerInner::InProcess(store) => Ok(store.get(key)),
            TrackerInner::Remote(store) => store.get(key),
        }
    }

    fn remove(&self, key: &str) -> Result<Option<i64>, TrackerError> {
        match &self.inner {
            TrackerInner::InProcess(store) => Ok(store.remove(key)),
            TrackerInner::Remote(store) => store.remove(key),
        }
    }

    fn peek_warmest(&self) -> Result<Option<String>, TrackerError> {
        match &self.inner {
            TrackerInner::InProcess(store) => Ok(store.peek_warmest()),
            TrackerInner::Remote(store) => store.peek_warmest(),
        }
    }
}

/// Builder for [`Tracker`] and the concrete backends.
#[derive(Debug, Clone, Default)]
pub struct TrackerBuilder {
    config: TrackerConfig,
}

impl TrackerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing configuration.
    pub fn from_config(config: TrackerConfig) -> Self {
        Self { config }
    }

    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.config.initial_capacity = capacity;
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.namespace = namespace.into();
        self
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn build_in_process(&self) -> OrderedKeyStore {
        OrderedKeyStore::with_capacity(self.config.initial_capacity)
    }

    /// Builds a remote store over `host`.
    ///
    /// # Panics
    ///
    /// Panics if the namespace is invalid. Use [`try_build_remote`](Self::try_build_remote)
    /// to handle that as an error.
    pub fn build_remote<H>(&self, host: Arc<H>) -> RemoteAtomicStore<H>
    where
        H: ScriptHost + ?Sized,
    {
        match self.try_build_remote(host) {
            Ok(store) => store,
            Err(err) => panic!("invalid tracker configuration: {err}"),
        }
    }

    pub fn try_build_remote<H>(&self, host: Arc<H>) -> Result<RemoteAtomicStore<H>, ConfigError>
    where
        H: ScriptHost + ?Sized,
    {
        let layout = FieldLayout::try_with_namespace(&self.config.namespace)?;
        Ok(RemoteAtomicStore::new(host, layout))
    }

    /// Builds a tracker on `backend`.
    ///
    /// # Panics
    ///
    /// Panics if the namespace is invalid; see [`try_build`](Self::try_build).
    pub fn build(&self, backend: Backend) -> Tracker {
        match self.try_build(backend) {
            Ok(tracker) => tracker,
            Err(err) => panic!("invalid tracker configuration: {err}"),
        }
    }

    /// Builds a tracker on `backend`, validating the configuration first.
    ///
    /// The namespace is checked for both backends so a configuration that
    /// works in-process does not start failing when switched to remote.
    pub fn try_build(&self, backend: Backend) -> Result<Tracker, ConfigError> {
        let layout = FieldLayout::try_with_namespace(&self.config.namespace)?;
        let inner = match backend {
            Backend::InProcess => TrackerInner::InProcess(self.build_in_process()),
            Backend::Remote(host) => TrackerInner::Remote(RemoteAtomicStore::new(host, layout)),
        };
        Ok(Tracker { inner })
    }
}
