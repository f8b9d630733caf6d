use crate::metrics::cell::MetricsCell;
use crate::metrics::snapshot::TrackerMetricsSnapshot;
use crate::metrics::traits::{MetricsReset, TrackerMetricsRecorder};

#[derive(Debug, Default)]
pub struct TrackerMetrics {
    pub get_calls: MetricsCell,
    pub get_misses: MetricsCell,
    pub fast_path_hits: MetricsCell,
    pub slow_path_entries: MetricsCell,
    pub slow_path_vanished: MetricsCell,
    pub slow_path_already_warmest: MetricsCell,
    pub promotions: MetricsCell,
    pub put_new: MetricsCell,
    pub put_updates: MetricsCell,
    pub remove_hits: MetricsCell,
    pub remove_misses: MetricsCell,
}

impl TrackerMetrics {
    pub fn snapshot(&self, len: usize) -> TrackerMetricsSnapshot {
        TrackerMetricsSnapshot {
            get_calls: self.get_calls.get(),
            get_misses: self.get_misses.get(),
            fast_path_hits: self.fast_path_hits.get(),
            slow_path_entries: self.slow_path_entries.get(),
            slow_path_vanished: self.slow_path_vanished.get(),
            slow_path_already_warmest: self.slow_path_already_warmest.get(),
            promotions: self.promotions.get(),
            put_new: self.put_new.get(),
            put_updates: self.put_updates.get(),
            remove_hits: self.remove_hits.get(),
            remove_misses: self.remove_misses.get(),
            len,
        }
    }
}

impl TrackerMetricsRecorder for TrackerMetrics {
    fn record_get_call(&self) {
        self.get_calls.incr();
    }

    fn record_get_miss(&self) {
        self.get_misses.incr();
    }

    fn record_fast_path_hit(&self) {
        self.fast_path_hits.incr();
    }

    fn record_slow_path_entry(&self) {
        self.slow_path_entries.incr();
    }

    fn record_slow_path_vanished(&self) {
        self.slow_path_vanished.incr();
    }

    fn record_slow_path_already_warmest(&self) {
        self.slow_path_already_warmest.incr();
    }

    fn record_promotion(&self) {
        self.promotions.incr();
    }

    fn record_put_new(&self) {
        self.put_new.incr();
    }

    fn record_put_update(&self) {
        self.put_updates.incr();
    }

    fn record_remove_hit(&self) {
        self.remove_hits.incr();
    }

    fn record_remove_miss(&self) {
        self.remove_misses.incr();
    }
}

impl MetricsReset for TrackerMetrics {
    fn reset_metrics(&self) {
        for cell in [
            &self.get_calls,
            &self.get_misses,
            &self.fast_path_hits,
            &self.slow_path_entries,
            &self.slow_path_vanished,
            &self.slow_path_already_warmest,
            &self.promotions,
            &self.put_new,
            &self.put_updates,
            &self.remove_hits,
            &self.remove_misses,
        ] {
            cell.reset();
        }
    }
}
