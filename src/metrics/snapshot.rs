/// Point-in-time copy of the [`OrderedKeyStore`](crate::store::ordered::OrderedKeyStore) counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TrackerMetricsSnapshot {
    pub get_calls: u64,
    pub get_misses: u64,
    /// `get` answered under the shared lock because the key was already warmest.
    pub fast_path_hits: u64,
    /// `get` released the shared lock to promote under the exclusive lock.
    pub slow_path_entries: u64,
    /// Slow path found the key removed after reacquiring.
    pub slow_path_vanished: u64,
    /// Slow path found the key already warmest after reacquiring.
    pub slow_path_already_warmest: u64,
    /// Link rewirings caused by `get` or `put` on a non-warmest key.
    pub promotions: u64,

    pub put_new: u64,
    pub put_updates: u64,
    pub remove_hits: u64,
    pub remove_misses: u64,

    // gauge captured at snapshot time
    pub len: usize,
}

impl TrackerMetricsSnapshot {
    /// `get` calls that returned a value.
    pub fn get_hits(&self) -> u64 {
        self.get_calls.saturating_sub(self.get_misses)
    }
}
