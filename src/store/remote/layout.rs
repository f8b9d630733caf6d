//! Names of the five persisted fields that make up a remote tracker.
//!
//! ```text
//!   <ns>:data   hash    key -> value
//!   <ns>:prev   hash    key -> colder neighbour
//!   <ns>:next   hash    key -> warmer neighbour
//!   <ns>:head   string  coldest key
//!   <ns>:tail   string  warmest key
//! ```
//!
//! On a clustered store every script must touch a single slot. Wrap the
//! namespace in a hash tag (for example `{orders}`) so all five names hash
//! together.

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLayout {
    values: String,
    prev: String,
    next: String,
    head: String,
    tail: String,
}

impl FieldLayout {
    pub const DEFAULT_NAMESPACE: &'static str = "warmest";

    /// Derives the field names from `namespace`.
    pub fn try_with_namespace(namespace: &str) -> Result<Self, ConfigError> {
        if namespace.trim().is_empty() {
            return Err(ConfigError::new("namespace must not be empty"));
        }
        if namespace.chars().any(char::is_whitespace) {
            return Err(ConfigError::new(format!(
                "namespace must not contain whitespace: {namespace:?}"
            )));
        }
        Ok(Self {
            values: format!("{namespace}:data"),
            prev: format!("{namespace}:prev"),
            next: format!("{namespace}:next"),
            head: format!("{namespace}:head"),
            tail: format!("{namespace}:tail"),
        })
    }

    /// Field names in the order every procedure expects them as `KEYS`.
    #[inline]
    pub fn keys(&self) -> [&str; 5] {
        [
            self.values.as_str(),
            self.prev.as_str(),
            self.next.as_str(),
            self.head.as_str(),
            self.tail.as_str(),
        ]
    }

    pub fn values(&self) -> &str {
        &self.values
    }

    pub fn prev(&self) -> &str {
        &self.prev
    }

    pub fn next(&self) -> &str {
        &self.next
    }

    pub fn head(&self) -> &str {
        &self.head
    }

    pub fn tail(&self) -> &str {
        &self.tail
    }
}

impl Default for FieldLayout {
    fn default() -> Self {
        match Self::try_with_namespace(Self::DEFAULT_NAMESPACE) {
            Ok(layout) => layout,
            Err(err) => unreachable!("default namespace rejected: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_uses_warmest_namespace() {
        let layout = FieldLayout::default();
        assert_eq!(
            layout.keys(),
            [
                "warmest:data",
                "warmest:prev",
                "warmest:next",
                "warmest:head",
                "warmest:tail"
            ]
        );
    }

    #[test]
    fn hash_tagged_namespace_is_kept_verbatim() {
        let layout = FieldLayout::try_with_namespace("{orders}").unwrap();
        assert_eq!(layout.values(), "{orders}:data");
        assert_eq!(layout.tail(), "{orders}:tail");
    }

    #[test]
    fn blank_or_spaced_namespaces_are_rejected() {
        assert!(FieldLayout::try_with_namespace("").is_err());
        assert!(FieldLayout::try_with_namespace("   ").is_err());
        let err = FieldLayout::try_with_namespace("a b").unwrap_err();
        assert!(err.message().contains("whitespace"));
    }
}
