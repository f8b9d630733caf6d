// ==============================================
// RACE CONDITION TESTS (integration)
// ==============================================
//
// Each scenario lines threads up on a `Barrier` so the contended calls start
// together, repeats enough rounds to hit the interesting interleavings, and
// validates structure afterwards. All scenarios run on both backends.

use std::panic;
use std::sync::mpsc;
use std::sync::{Arc, Barrier};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use warmkit::error::InvariantError;
use warmkit::store::ordered::OrderedKeyStore;
use warmkit::store::remote::{FieldLayout, MemoryHost, RemoteAtomicStore};
use warmkit::traits::WarmestTracker;

const ROUNDS: usize = 200;

type Check = Arc<dyn Fn() -> Result<(), InvariantError> + Send + Sync>;

struct Subject {
    name: &'static str,
    tracker: Arc<dyn WarmestTracker>,
    check: Check,
}

fn in_process() -> (Arc<OrderedKeyStore>, Subject) {
    let store = Arc::new(OrderedKeyStore::new());
    let checked = Arc::clone(&store);
    let subject = Subject {
        name: "in-process",
        tracker: store.clone(),
        check: Arc::new(move || checked.check_invariants()),
    };
    (store, subject)
}

fn remote() -> Subject {
    let host = Arc::new(MemoryHost::new());
    let layout = FieldLayout::default();
    let store = RemoteAtomicStore::new(Arc::clone(&host), layout.clone());
    Subject {
        name: "remote",
        tracker: Arc::new(store),
        check: Arc::new(move || host.check_layout(&layout)),
    }
}

fn subjects() -> Vec<Subject> {
    vec![in_process().1, remote()]
}

/// Runs `a` and `b` on two threads released together.
fn race<A, B, RA, RB>(a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send + 'static,
    B: FnOnce() -> RB + Send + 'static,
    RA: Send + 'static,
    RB: Send + 'static,
{
    let barrier = Arc::new(Barrier::new(2));
    let ba = Arc::clone(&barrier);
    let ta = thread::spawn(move || {
        ba.wait();
        a()
    });
    let bb = Arc::clone(&barrier);
    let tb = thread::spawn(move || {
        bb.wait();
        b()
    });
    (ta.join().unwrap(), tb.join().unwrap())
}

/// Waits for every worker to report completion, failing on a timeout
/// (likely deadlock). A worker that panicked is joined and its panic is
/// re-raised with the original message.
fn await_workers(
    name: &str,
    handles: Vec<JoinHandle<()>>,
    done_rx: mpsc::Receiver<()>,
    timeout: Duration,
) {
    let mut finished = 0;
    while finished < handles.len() {
        match done_rx.recv_timeout(timeout) {
            Ok(()) => finished += 1,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                panic!("{name}: {} of {} workers did not finish", handles.len() - finished, handles.len())
            },
        }
    }
    for handle in handles {
        if let Err(payload) = handle.join() {
            panic::resume_unwind(payload);
        }
    }
}

mod fast_path {
    use super::*;

    #[test]
    fn get_racing_put_sees_old_or_new_value() {
        for s in subjects() {
            for round in 0..ROUNDS {
                let t = &s.tracker;
                t.put("other", -1).unwrap();
                t.put("k", 1).unwrap();

                let reader = Arc::clone(t);
                let writer = Arc::clone(t);
                let (seen, previous) =
                    race(move || reader.get("k").unwrap(), move || writer.put("k", 2).unwrap());

                assert!(
                    matches!(seen, Some(1) | Some(2)),
                    "{} round {round}: torn read {seen:?}",
                    s.name
                );
                assert_eq!(previous, Some(1));
                assert_eq!(t.peek_warmest().unwrap().as_deref(), Some("k"));
                (s.check)().unwrap();
                t.remove("k").unwrap();
            }
        }
    }

    #[test]
    fn get_racing_remove_sees_value_or_absent() {
        for s in subjects() {
            for round in 0..ROUNDS {
                let t = &s.tracker;
                t.put("a", 0).unwrap();
                t.put("k", 5).unwrap();

                let reader = Arc::clone(t);
                let remover = Arc::clone(t);
                let (seen, removed) =
                    race(move || reader.get("k").unwrap(), move || remover.remove("k").unwrap());

                assert!(matches!(seen, Some(5) | None), "{} round {round}", s.name);
                assert_eq!(removed, Some(5));
                assert_eq!(t.peek_warmest().unwrap().as_deref(), Some("a"));
                (s.check)().unwrap();
            }
        }
    }
}

mod slow_path {
    use super::*;

    #[test]
    fn cold_get_racing_remove_leaves_neighbours_linked() {
        for s in subjects() {
            for round in 0..ROUNDS {
                let t = &s.tracker;
                t.put("left", 1).unwrap();
                t.put("k", 2).unwrap();
                t.put("right", 3).unwrap();

                let reader = Arc::clone(t);
                let remover = Arc::clone(t);
                let (seen, removed) =
                    race(move || reader.get("k").unwrap(), move || remover.remove("k").unwrap());

                assert!(matches!(seen, Some(2) | None), "{} round {round}", s.name);
                assert_eq!(removed, Some(2));
                // a vanished key must not have been re-linked
                assert_eq!(t.get("k").unwrap(), None);
                (s.check)().unwrap();

                assert_eq!(t.remove("left").unwrap(), Some(1));
                assert_eq!(t.remove("right").unwrap(), Some(3));
                assert_eq!(t.peek_warmest().unwrap(), None);
                (s.check)().unwrap();
            }
        }
    }

    #[test]
    fn cold_get_racing_put_returns_old_or_new_value() {
        for s in subjects() {
            for round in 0..ROUNDS {
                let t = &s.tracker;
                t.put("k", 10).unwrap();
                t.put("warm", 0).unwrap();

                let reader = Arc::clone(t);
                let writer = Arc::clone(t);
                let (seen, previous) =
                    race(move || reader.get("k").unwrap(), move || writer.put("k", 11).unwrap());

                assert!(matches!(seen, Some(10) | Some(11)), "{} round {round}", s.name);
                assert_eq!(previous, Some(10));
                assert_eq!(t.peek_warmest().unwrap().as_deref(), Some("k"));
                assert_eq!(t.get("k").unwrap(), Some(11));
                (s.check)().unwrap();
                t.remove("k").unwrap();
                t.remove("warm").unwrap();
            }
        }
    }

    #[test]
    fn concurrent_cold_gets_all_return_value() {
        const READERS: usize = 8;
        for s in subjects() {
            for _ in 0..ROUNDS / 4 {
                let t = &s.tracker;
                t.put("k", 42).unwrap();
                t.put("a", 1).unwrap();
                t.put("b", 2).unwrap();

                let barrier = Arc::new(Barrier::new(READERS));
                let handles: Vec<_> = (0..READERS)
                    .map(|_| {
                        let barrier = Arc::clone(&barrier);
                        let t = Arc::clone(t);
                        thread::spawn(move || {
                            barrier.wait();
                            t.get("k").unwrap()
                        })
                    })
                    .collect();
                for handle in handles {
                    assert_eq!(handle.join().unwrap(), Some(42), "{}", s.name);
                }

                assert_eq!(t.peek_warmest().unwrap().as_deref(), Some("k"));
                // "b" must now sit directly below "k"
                t.remove("k").unwrap();
                assert_eq!(t.peek_warmest().unwrap().as_deref(), Some("b"));
                (s.check)().unwrap();
                t.remove("a").unwrap();
                t.remove("b").unwrap();
            }
        }
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn concurrent_cold_gets_promote_exactly_once() {
        use warmkit::metrics::MetricsReset;

        const READERS: usize = 8;
        let (store, _) = in_process();
        for _ in 0..ROUNDS / 4 {
            OrderedKeyStore::put(&store, "k", 1);
            OrderedKeyStore::put(&store, "a", 2);
            store.reset_metrics();

            let barrier = Arc::new(Barrier::new(READERS));
            let handles: Vec<_> = (0..READERS)
                .map(|_| {
                    let barrier = Arc::clone(&barrier);
                    let store = Arc::clone(&store);
                    thread::spawn(move || {
                        barrier.wait();
                        OrderedKeyStore::get(&store, "k")
                    })
                })
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), Some(1));
            }

            let snap = store.metrics_snapshot();
            assert_eq!(snap.promotions, 1, "{snap:?}");
            assert_eq!(snap.get_calls, READERS as u64);
            assert_eq!(snap.get_misses, 0);
            assert_eq!(
                snap.fast_path_hits + snap.slow_path_already_warmest + snap.promotions,
                READERS as u64,
                "{snap:?}"
            );
            store.clear();
        }
    }
}

mod mixed {
    use super::*;

    #[test]
    fn put_racing_remove_is_all_or_nothing() {
        for s in subjects() {
            for round in 0..ROUNDS {
                let t = &s.tracker;
                t.put("base", 0).unwrap();

                let writer = Arc::clone(t);
                let remover = Arc::clone(t);
                let (previous, removed) =
                    race(move || writer.put("k", 7).unwrap(), move || remover.remove("k").unwrap());

                assert_eq!(previous, None, "{} round {round}", s.name);
                match removed {
                    // remove ran second: nothing left but base
                    Some(7) => {
                        assert_eq!(t.get("k").unwrap(), None);
                        assert_eq!(t.peek_warmest().unwrap().as_deref(), Some("base"));
                    },
                    // remove ran first: k is present and warmest
                    None => {
                        assert_eq!(t.peek_warmest().unwrap().as_deref(), Some("k"));
                        assert_eq!(t.remove("k").unwrap(), Some(7));
                    },
                    other => panic!("{} round {round}: unexpected {other:?}", s.name),
                }
                (s.check)().unwrap();
            }
        }
    }

    #[test]
    fn high_contention_finishes_and_stays_consistent() {
        const THREADS: usize = 8;
        const OPS: usize = 2_000;
        const KEYS: usize = 16;

        for s in subjects() {
            let barrier = Arc::new(Barrier::new(THREADS));
            let (done_tx, done_rx) = mpsc::channel();

            let handles: Vec<_> = (0..THREADS)
                .map(|thread_id| {
                    let barrier = Arc::clone(&barrier);
                    let t = Arc::clone(&s.tracker);
                    let done_tx = done_tx.clone();
                    thread::spawn(move || {
                        barrier.wait();
                        for i in 0..OPS {
                            let key = format!("k{}", (i * 7 + thread_id) % KEYS);
                            let outcome = match (i + thread_id) % 5 {
                                0 | 1 => t.get(&key).map(drop),
                                2 => t.put(&key, i as i64).map(drop),
                                3 => t.remove(&key).map(drop),
                                _ => t.peek_warmest().map(drop),
                            };
                            outcome.unwrap();
                        }
                        let _ = done_tx.send(());
                    })
                })
                .collect();
            drop(done_tx);

            await_workers(s.name, handles, done_rx, Duration::from_secs(60));
            (s.check)().unwrap();

            if let Some(warm) = s.tracker.peek_warmest().unwrap() {
                assert!(s.tracker.get(&warm).unwrap().is_some());
            }
        }
    }

    #[test]
    #[should_panic(expected = "worker exploded")]
    fn panicking_worker_surfaces_its_own_message() {
        let (done_tx, done_rx) = mpsc::channel();
        let handles: Vec<_> = (0..2)
            .map(|id| {
                let done_tx = done_tx.clone();
                thread::spawn(move || {
                    if id == 1 {
                        panic!("worker exploded");
                    }
                    let _ = done_tx.send(());
                })
            })
            .collect();
        drop(done_tx);
        await_workers("harness", handles, done_rx, Duration::from_secs(60));
    }
}
