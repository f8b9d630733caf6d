//! # Remote recency tracker
//!
//! Keeps the recency list in an external store that can run a short
//! procedure atomically. Each operation is a single [`Procedure`] call; the
//! host guarantees no other procedure interleaves with it, so no client-side
//! locking is needed and any number of processes may share one layout.
//!
//! ```text
//!   RemoteAtomicStore ── eval(Procedure, KEYS, ARGV) ──► ScriptHost
//!                                                          │ atomic
//!                                                          ▼
//!          <ns>:data  <ns>:prev  <ns>:next  <ns>:head  <ns>:tail
//! ```
//!
//! Values cross the wire as decimal strings. A reply that does not parse
//! back into an `i64` is a [`TrackerError::MalformedReply`]; a host failure
//! is a [`TrackerError::Unavailable`], or [`TrackerError::Rejected`] when the
//! host refused the call as malformed. None is retried.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use warmkit::store::remote::{FieldLayout, MemoryHost, RemoteAtomicStore};
//!
//! let host = Arc::new(MemoryHost::new());
//! let store = RemoteAtomicStore::new(Arc::clone(&host), FieldLayout::default());
//!
//! store.put("a", 1).unwrap();
//! store.put("b", 2).unwrap();
//! assert_eq!(store.get("a").unwrap(), Some(1));
//! assert_eq!(store.peek_warmest().unwrap().as_deref(), Some("a"));
//!
//! host.set_available(false);
//! assert!(store.get("a").is_err());
//! ```

mod layout;
mod memory;
mod script;

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::TrackerError;
use crate::traits::WarmestTracker;

pub use layout::FieldLayout;
pub use memory::MemoryHost;
pub use script::{Procedure, ScriptHost};

/// Tracker whose state lives behind a [`ScriptHost`].
pub struct RemoteAtomicStore<H: ?Sized = dyn ScriptHost> {
    host: Arc<H>,
    layout: FieldLayout,
}

impl<H> RemoteAtomicStore<H>
where
    H: ScriptHost + ?Sized,
{
    pub fn new(host: Arc<H>, layout: FieldLayout) -> Self {
        Self { host, layout }
    }

    pub fn layout(&self) -> &FieldLayout {
        &self.layout
    }

    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    pub fn put(&self, key: &str, value: i64) -> Result<Option<i64>, TrackerError> {
        let value = value.to_string();
        let reply = self.call(Procedure::Put, &[key, &value])?;
        decode_value(Procedure::Put, reply)
    }

    pub fn get(&self, key: &str) -> Result<Option<i64>, TrackerError> {
        let reply = self.call(Procedure::Get, &[key])?;
        decode_value(Procedure::Get, reply)
    }

    pub fn remove(&self, key: &str) -> Result<Option<i64>, TrackerError> {
        let reply = self.call(Procedure::Remove, &[key])?;
        decode_value(Procedure::Remove, reply)
    }

    pub fn peek_warmest(&self) -> Result<Option<String>, TrackerError> {
        self.call(Procedure::PeekWarmest, &[])
    }

    fn call(&self, procedure: Procedure, args: &[&str]) -> Result<Option<String>, TrackerError> {
        debug!(
            procedure = procedure.name(),
            key = args.first().copied().unwrap_or_default(),
            values = %self.layout.values(),
            "dispatching"
        );
        self.host
            .eval(procedure, &self.layout.keys(), args)
            .map_err(|err| {
                warn!(procedure = procedure.name(), error = %err, "remote procedure failed");
                TrackerError::from_host(procedure.name(), err)
            })
    }
}

fn decode_value(procedure: Procedure, reply: Option<String>) -> Result<Option<i64>, TrackerError> {
    let Some(reply) = reply else {
        return Ok(None);
    };
    match reply.parse::<i64>() {
        Ok(value) => Ok(Some(value)),
        Err(_) => {
            warn!(procedure = procedure.name(), reply = %reply, "undecodable reply");
            Err(TrackerError::MalformedReply {
                procedure: procedure.name(),
                reply,
            })
        },
    }
}

impl<H> Clone for RemoteAtomicStore<H>
where
    H: ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            host: Arc::clone(&self.host),
            layout: self.layout.clone(),
        }
    }
}

impl<H> fmt::Debug for RemoteAtomicStore<H>
where
    H: ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteAtomicStore")
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl<H> WarmestTracker for RemoteAtomicStore<H>
where
    H: ScriptHost + ?Sized,
{
    fn put(&self, key: &str, value: i64) -> Result<Option<i64>, TrackerError> {
        RemoteAtomicStore::put(self, key, value)
    }

    fn get(&self, key: &str) -> Result<Option<i64>, TrackerError> {
        RemoteAtomicStore::get(self, key)
    }

    fn remove(&self, key: &str) -> Result<Option<i64>, TrackerError> {
        RemoteAtomicStore::remove(self, key)
    }

    fn peek_warmest(&self) -> Result<Option<String>, TrackerError> {
        RemoteAtomicStore::peek_warmest(self)
    }
}
