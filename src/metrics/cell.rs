use std::sync::atomic::{AtomicU64, Ordering};

/// A monotonically increasing counter.
///
/// Recorded from both the shared and the exclusive side of the store lock,
/// so it cannot rely on the lock for exclusion. Relaxed ordering is enough:
/// counters are observational and never gate control flow.
#[repr(transparent)]
#[derive(Debug, Default)]
pub struct MetricsCell(AtomicU64);

impl MetricsCell {
    #[inline]
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    #[inline]
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn incr(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn reset(&self) {
        self.0.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn concurrent_increments_are_not_lost() {
        let cell = Arc::new(MetricsCell::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cell = cell.clone();
                thread::spawn(move || {
                    for _ in 0..1_000 {
                        cell.incr();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cell.get(), 4_000);
        cell.reset();
        assert_eq!(cell.get(), 0);
    }
}
