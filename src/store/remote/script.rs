//! The four server-side procedures and the host abstraction that runs them.
//!
//! Each procedure reads and rewrites the fields named by a
//! [`FieldLayout`](super::FieldLayout) in one atomic step. Hosts with
//! server-side scripting run [`Procedure::source`]; other hosts dispatch on
//! the [`Procedure`] value and run an equivalent routine under their own
//! exclusion (see [`MemoryHost`](super::MemoryHost)).
//!
//! | Procedure      | ARGV           | Reply                        |
//! |----------------|----------------|------------------------------|
//! | `PUT`          | key, value     | previous value or nil        |
//! | `GET`          | key            | value or nil (promotes key)  |
//! | `REMOVE`       | key            | removed value or nil         |
//! | `PEEK_WARMEST` | -              | warmest key or nil           |
//!
//! `KEYS` is always the five layout names in [`FieldLayout::keys`](super::FieldLayout::keys) order.

use crate::error::HostError;

/// One atomic tracker operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Procedure {
    Put,
    Get,
    Remove,
    PeekWarmest,
}

impl Procedure {
    pub const ALL: [Procedure; 4] = [
        Procedure::Put,
        Procedure::Get,
        Procedure::Remove,
        Procedure::PeekWarmest,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Procedure::Put => "PUT",
            Procedure::Get => "GET",
            Procedure::Remove => "REMOVE",
            Procedure::PeekWarmest => "PEEK_WARMEST",
        }
    }

    /// Lua source for stores that evaluate scripts server-side.
    pub fn source(self) -> &'static str {
        match self {
            Procedure::Put => include_str!("../../../scripts/put.lua"),
            Procedure::Get => include_str!("../../../scripts/get.lua"),
            Procedure::Remove => include_str!("../../../scripts/remove.lua"),
            Procedure::PeekWarmest => include_str!("../../../scripts/peek_warmest.lua"),
        }
    }

    /// Number of `ARGV` entries the procedure expects.
    pub fn arity(self) -> usize {
        match self {
            Procedure::Put => 2,
            Procedure::Get | Procedure::Remove => 1,
            Procedure::PeekWarmest => 0,
        }
    }
}

/// A store that can execute a [`Procedure`] atomically.
///
/// `keys` are the five layout names and `args` the procedure's `ARGV`.
/// The reply is `None` for a nil reply. Transport failures are reported as
/// [`HostError`] and must never be folded into a nil reply.
///
/// Implementations must not retry internally.
pub trait ScriptHost: Send + Sync {
    fn eval(
        &self,
        procedure: Procedure,
        keys: &[&str],
        args: &[&str],
    ) -> Result<Option<String>, HostError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_procedure_has_a_script_touching_the_tail() {
        for procedure in Procedure::ALL {
            let source = procedure.source();
            assert!(
                source.contains("KEYS[5]"),
                "{} script does not reference the tail field",
                procedure.name()
            );
        }
    }

    #[test]
    fn mutating_scripts_maintain_links() {
        for procedure in [Procedure::Put, Procedure::Get, Procedure::Remove] {
            let source = procedure.source();
            assert!(source.contains("local function detach"));
            assert!(source.contains("HDEL"));
        }
        assert!(Procedure::Put.source().contains("attach_tail"));
        assert!(!Procedure::Remove.source().contains("attach_tail"));
    }

    #[test]
    fn arity_matches_wire_contract() {
        assert_eq!(Procedure::Put.arity(), 2);
        assert_eq!(Procedure::Get.arity(), 1);
        assert_eq!(Procedure::Remove.arity(), 1);
        assert_eq!(Procedure::PeekWarmest.arity(), 0);
        assert_eq!(Procedure::PeekWarmest.name(), "PEEK_WARMEST");
    }
}
