//! In-process [`ScriptHost`] that keeps the five fields in memory.
//!
//! Every procedure runs start to finish under one mutex, which gives the
//! same all-or-nothing behaviour a scripting server gives a Lua script. The
//! routines below follow the statements of `scripts/*.lua` one for one, so
//! the field contents after any call sequence match what a real server
//! would hold.
//!
//! The host can be switched offline with [`MemoryHost::set_available`] to
//! exercise failure handling.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::error::{HostError, InvariantError};
use crate::store::remote::layout::FieldLayout;
use crate::store::remote::script::{Procedure, ScriptHost};

/// Hash and string fields, addressed by field name.
#[derive(Debug, Default)]
struct FieldSpace {
    hashes: FxHashMap<String, FxHashMap<String, String>>,
    strings: FxHashMap<String, String>,
}

impl FieldSpace {
    fn hget(&self, hash: &str, field: &str) -> Option<String> {
        self.hashes.get(hash)?.get(field).cloned()
    }

    fn hset(&mut self, hash: &str, field: &str, value: &str) {
        self.hashes
            .entry(hash.to_owned())
            .or_default()
            .insert(field.to_owned(), value.to_owned());
    }

    // Empty hashes disappear, as they do on a real server.
    fn hdel(&mut self, hash: &str, field: &str) {
        if let Some(entries) = self.hashes.get_mut(hash) {
            entries.remove(field);
            if entries.is_empty() {
                self.hashes.remove(hash);
            }
        }
    }

    fn get(&self, key: &str) -> Option<String> {
        self.strings.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.strings.insert(key.to_owned(), value.to_owned());
    }

    fn del(&mut self, key: &str) {
        self.strings.remove(key);
    }
}

/// Field names bound for one call, mirroring the `KEYS` locals of the scripts.
struct Fields<'a> {
    values: &'a str,
    prev: &'a str,
    next: &'a str,
    head: &'a str,
    tail: &'a str,
}

impl<'a> Fields<'a> {
    fn bind(keys: &[&'a str]) -> Result<Self, HostError> {
        match keys {
            [values, prev, next, head, tail] => Ok(Self {
                values: *values,
                prev: *prev,
                next: *next,
                head: *head,
                tail: *tail,
            }),
            _ => Err(HostError::ScriptRejected(format!(
                "expected 5 keys, got {}",
                keys.len()
            ))),
        }
    }
}

fn detach(space: &mut FieldSpace, f: &Fields<'_>, key: &str) {
    let p = space.hget(f.prev, key);
    let n = space.hget(f.next, key);
    match (&p, &n) {
        (Some(p), Some(n)) => space.hset(f.next, p, n),
        (Some(p), None) => space.hdel(f.next, p),
        (None, Some(n)) => space.set(f.head, n),
        (None, None) => space.del(f.head),
    }
    match (&n, &p) {
        (Some(n), Some(p)) => space.hset(f.prev, n, p),
        (Some(n), None) => space.hdel(f.prev, n),
        (None, Some(p)) => space.set(f.tail, p),
        (None, None) => space.del(f.tail),
    }
    space.hdel(f.prev, key);
    space.hdel(f.next, key);
}

fn attach_tail(space: &mut FieldSpace, f: &Fields<'_>, key: &str) {
    match space.get(f.tail) {
        Some(t) => {
            space.hset(f.next, &t, key);
            space.hset(f.prev, key, &t);
        },
        None => space.set(f.head, key),
    }
    space.set(f.tail, key);
}

fn run_put(space: &mut FieldSpace, f: &Fields<'_>, key: &str, value: &str) -> Option<String> {
    let old = space.hget(f.values, key);
    space.hset(f.values, key, value);
    let Some(old) = old else {
        attach_tail(space, f, key);
        return None;
    };
    if space.get(f.tail).as_deref() != Some(key) {
        detach(space, f, key);
        attach_tail(space, f, key);
    }
    Some(old)
}

fn run_get(space: &mut FieldSpace, f: &Fields<'_>, key: &str) -> Option<String> {
    let value = space.hget(f.values, key)?;
    if space.get(f.tail).as_deref() != Some(key) {
        detach(space, f, key);
        attach_tail(space, f, key);
    }
    Some(value)
}

fn run_remove(space: &mut FieldSpace, f: &Fields<'_>, key: &str) -> Option<String> {
    let value = space.hget(f.values, key)?;
    detach(space, f, key);
    space.hdel(f.values, key);
    Some(value)
}

/// Atomic in-memory script host.
#[derive(Debug)]
pub struct MemoryHost {
    space: Mutex<FieldSpace>,
    available: AtomicBool,
    calls: AtomicU64,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self {
            space: Mutex::new(FieldSpace::default()),
            available: AtomicBool::new(true),
            calls: AtomicU64::new(0),
        }
    }

    /// Takes the host on or offline. While offline every `eval` fails with
    /// [`HostError::ConnectionRefused`] and no field is touched.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    /// Number of procedures that reached the field space.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    /// Copy of a hash field, empty if the field does not exist.
    pub fn hash_snapshot(&self, hash: &str) -> Vec<(String, String)> {
        let space = self.space.lock();
        let mut entries: Vec<_> = space
            .hashes
            .get(hash)
            .map(|h| h.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        entries.sort();
        entries
    }

    /// Value of a string field.
    pub fn string_value(&self, key: &str) -> Option<String> {
        self.space.lock().get(key)
    }

    /// Drops every field.
    pub fn flush(&self) {
        let mut space = self.space.lock();
        space.hashes.clear();
        space.strings.clear();
    }

    /// Checks the persisted list under `layout` for structural consistency.
    ///
    /// Walks `next` from `head`, checking each `prev` link on the way, and
    /// verifies the walk ends at `tail`, visits every key in the values hash
    /// and leaves no orphaned link entries behind.
    pub fn check_layout(&self, layout: &FieldLayout) -> Result<(), InvariantError> {
        let space = self.space.lock();
        let empty = FxHashMap::default();
        let values = space.hashes.get(layout.values()).unwrap_or(&empty);
        let prev = space.hashes.get(layout.prev()).unwrap_or(&empty);
        let next = space.hashes.get(layout.next()).unwrap_or(&empty);
        let head = space.strings.get(layout.head());
        let tail = space.strings.get(layout.tail());

        let (head, tail) = match (head, tail) {
            (None, None) => {
                if values.is_empty() && prev.is_empty() && next.is_empty() {
                    return Ok(());
                }
                return Err(InvariantError::new(format!(
                    "no head or tail but {} values, {} prev links, {} next links",
                    values.len(),
                    prev.len(),
                    next.len()
                )));
            },
            (Some(head), Some(tail)) => (head, tail),
            _ => return Err(InvariantError::new("exactly one of head/tail is set")),
        };

        if prev.contains_key(head) {
            return Err(InvariantError::new(format!("head {head:?} has a prev link")));
        }
        if next.contains_key(tail) {
            return Err(InvariantError::new(format!("tail {tail:?} has a next link")));
        }

        let mut visited = 0usize;
        let mut current = head.as_str();
        loop {
            if !values.contains_key(current) {
                return Err(InvariantError::new(format!(
                    "linked key {current:?} has no value"
                )));
            }
            visited += 1;
            if visited > values.len() {
                return Err(InvariantError::new("next chain is longer than values hash"));
            }
            match next.get(current) {
                Some(n) => {
                    if prev.get(n).map(String::as_str) != Some(current) {
                        return Err(InvariantError::new(format!(
                            "prev of {n:?} does not point back at {current:?}"
                        )));
                    }
                    current = n.as_str();
                },
                None => break,
            }
        }

        if current != tail.as_str() {
            return Err(InvariantError::new(format!(
                "walk ended at {current:?} but tail is {tail:?}"
            )));
        }
        if visited != values.len() {
            return Err(InvariantError::new(format!(
                "walk reached {visited} keys but values hash holds {}",
                values.len()
            )));
        }
        if prev.len() + 1 != visited || next.len() + 1 != visited {
            return Err(InvariantError::new("orphaned prev/next entries"));
        }
        Ok(())
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptHost for MemoryHost {
    fn eval(
        &self,
        procedure: Procedure,
        keys: &[&str],
        args: &[&str],
    ) -> Result<Option<String>, HostError> {
        if !self.is_available() {
            return Err(HostError::ConnectionRefused("memory host is offline".into()));
        }
        let fields = Fields::bind(keys)?;
        if args.len() != procedure.arity() {
            return Err(HostError::ScriptRejected(format!(
                "{} expects {} args, got {}",
                procedure.name(),
                procedure.arity(),
                args.len()
            )));
        }

        let mut space = self.space.lock();
        self.calls.fetch_add(1, Ordering::Relaxed);
        let reply = match (procedure, args) {
            (Procedure::Put, [key, value]) => run_put(&mut space, &fields, key, value),
            (Procedure::Get, [key]) => run_get(&mut space, &fields, key),
            (Procedure::Remove, [key]) => run_remove(&mut space, &fields, key),
            (Procedure::PeekWarmest, []) => space.get(fields.tail),
            _ => unreachable!("arity checked above"),
        };
        Ok(reply)
    }
}
