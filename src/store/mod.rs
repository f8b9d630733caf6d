//! Tracker backends.
//!
//! - [`ordered::OrderedKeyStore`]: in-process, `RwLock` around a hash index
//!   and recency list.
//! - [`remote::RemoteAtomicStore`]: state lives in an external store and each
//!   operation is one atomic server-side procedure.
//!
//! Both implement [`WarmestTracker`](crate::traits::WarmestTracker) and give
//! the same answers for the same call sequence.

pub mod ordered;
pub mod remote;
