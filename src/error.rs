//! Error types for warmkit.
//!
//! ## Key Components
//!
//! - [`TrackerError`]: The only error a tracker operation can return. It
//!   means the remote store could not be reached, refused the call, or
//!   answered with something that is not a valid reply. A missing key is never an error; it is
//!   `Ok(None)`.
//! - [`HostError`]: Raised by a [`ScriptHost`](crate::store::remote::ScriptHost)
//!   transport. Converts into [`TrackerError::Unavailable`], or
//!   [`TrackerError::Rejected`] when the host refused the call itself.
//! - [`InvariantError`]: Returned by `check_invariants` methods when the
//!   list/map structure is inconsistent.
//! - [`ConfigError`]: Returned when builder or layout parameters are invalid.
//!
//! ## Example Usage
//!
//! ```
//! use warmkit::error::ConfigError;
//! use warmkit::store::remote::FieldLayout;
//!
//! let layout: Result<FieldLayout, ConfigError> = FieldLayout::try_with_namespace("orders");
//! assert!(layout.is_ok());
//!
//! let bad = FieldLayout::try_with_namespace("  ");
//! assert!(bad.is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// TrackerError
// ---------------------------------------------------------------------------

/// Failure of a tracker operation.
///
/// Only the remote backend produces these. Absence of a key is reported as
/// `Ok(None)` and never reaches this type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackerError {
    /// The remote store could not run the procedure.
    #[error("remote store unavailable during {procedure}: {reason}")]
    Unavailable {
        procedure: &'static str,
        reason: String,
    },
    /// The host refused the call as malformed (wrong key or argument
    /// count). Points at a misconfigured host or layout, not at the network.
    #[error("remote store rejected {procedure}: {reason}")]
    Rejected {
        procedure: &'static str,
        reason: String,
    },
    /// The remote store answered with a value this crate cannot decode.
    #[error("malformed reply from {procedure}: {reply:?}")]
    MalformedReply {
        procedure: &'static str,
        reply: String,
    },
}

impl TrackerError {
    /// Name of the procedure that failed.
    pub fn procedure(&self) -> &'static str {
        match self {
            TrackerError::Unavailable { procedure, .. }
            | TrackerError::Rejected { procedure, .. }
            | TrackerError::MalformedReply { procedure, .. } => procedure,
        }
    }

    /// Connection and timeout failures become [`Unavailable`](Self::Unavailable);
    /// a rejected script becomes [`Rejected`](Self::Rejected).
    pub(crate) fn from_host(procedure: &'static str, err: HostError) -> Self {
        match err {
            HostError::ScriptRejected(reason) => TrackerError::Rejected { procedure, reason },
            other => TrackerError::Unavailable {
                procedure,
                reason: other.to_string(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// HostError
// ---------------------------------------------------------------------------

/// Transport-level failure reported by a script host.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("connection refused: {0}")]
    ConnectionRefused(String),
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("script rejected: {0}")]
    ScriptRejected(String),
}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when the recency structure is internally inconsistent.
///
/// Produced by `check_invariants` on
/// [`RecencyCore`](crate::store::ordered::RecencyCore),
/// [`OrderedKeyStore`](crate::store::ordered::OrderedKeyStore) and
/// [`MemoryHost::check_layout`](crate::store::remote::MemoryHost::check_layout).
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when tracker configuration is invalid.
///
/// Produced by [`TrackerBuilder::try_build`](crate::builder::TrackerBuilder::try_build)
/// and [`FieldLayout::try_with_namespace`](crate::store::remote::FieldLayout::try_with_namespace).
///
/// # Example
///
/// ```
/// use warmkit::builder::{Backend, TrackerBuilder};
///
/// let err = TrackerBuilder::new().namespace("").try_build(Backend::InProcess).unwrap_err();
/// assert!(err.to_string().contains("namespace"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
