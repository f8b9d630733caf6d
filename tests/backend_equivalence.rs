// ==============================================
// BACKEND EQUIVALENCE (property tests)
// ==============================================
//
// Drives the in-process store and the remote store with the same random
// operation sequence and requires identical replies at every step, plus
// intact structure on both sides.

use std::sync::Arc;

use proptest::prelude::*;
use warmkit::store::ordered::OrderedKeyStore;
use warmkit::store::remote::{FieldLayout, MemoryHost, RemoteAtomicStore};
use warmkit::traits::WarmestTracker;

#[derive(Debug, Clone)]
enum Op {
    Put(u8, i64),
    Get(u8),
    Remove(u8),
    PeekWarmest,
}

fn op_strategy(keys: u8) -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..keys, any::<i64>()).prop_map(|(k, v)| Op::Put(k, v)),
        3 => (0..keys).prop_map(Op::Get),
        2 => (0..keys).prop_map(Op::Remove),
        1 => Just(Op::PeekWarmest),
    ]
}

/// Reply of one operation, normalised across the four signatures.
#[derive(Debug, PartialEq, Eq)]
enum Reply {
    Value(Option<i64>),
    Key(Option<String>),
}

fn apply(tracker: &dyn WarmestTracker, op: &Op) -> Reply {
    let reply = match op {
        Op::Put(k, v) => tracker.put(&format!("key-{k}"), *v).map(Reply::Value),
        Op::Get(k) => tracker.get(&format!("key-{k}")).map(Reply::Value),
        Op::Remove(k) => tracker.remove(&format!("key-{k}")).map(Reply::Value),
        Op::PeekWarmest => tracker.peek_warmest().map(Reply::Key),
    };
    reply.expect("neither backend fails while the host is up")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_backends_reply_identically(ops in prop::collection::vec(op_strategy(12), 1..300)) {
        let local = OrderedKeyStore::new();
        let host = Arc::new(MemoryHost::new());
        let layout = FieldLayout::default();
        let remote = RemoteAtomicStore::new(Arc::clone(&host), layout.clone());

        for op in &ops {
            let expected = apply(&local, op);
            let actual = apply(&remote, op);
            prop_assert_eq!(&actual, &expected, "diverged on {:?}", op);
            prop_assert!(local.check_invariants().is_ok());
            prop_assert!(host.check_layout(&layout).is_ok());
        }

        // Draining both from the cold end must yield the same order.
        let order = local.keys_by_recency();
        for key in order.iter().rev() {
            let warm = remote.peek_warmest().unwrap();
            prop_assert_eq!(warm.as_deref(), Some(key.as_str()));
            prop_assert_eq!(remote.remove(key).unwrap(), local.remove(key));
        }
        prop_assert_eq!(remote.peek_warmest().unwrap(), None);
        prop_assert!(host.hash_snapshot(layout.values()).is_empty());
    }

    /// Hot-key workload: a few keys touched over and over exercises the
    /// already-warmest branches on both sides.
    #[test]
    fn prop_hot_keys_keep_tail_in_sync(ops in prop::collection::vec(op_strategy(3), 1..200)) {
        let local = OrderedKeyStore::new();
        let host = Arc::new(MemoryHost::new());
        let remote = RemoteAtomicStore::new(host, FieldLayout::default());

        for op in &ops {
            apply(&local, op);
            apply(&remote, op);
            prop_assert_eq!(remote.peek_warmest().unwrap(), local.peek_warmest());
        }
    }
}
