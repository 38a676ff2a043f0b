// randtick/crates/randtick/src/stats.rs

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Counters shared between a ticker and its emission loops.
///
/// Totals accumulate across restarts of the same ticker.
#[derive(Debug, Default)]
pub struct TickerStats {
    emitted: AtomicU64,
    dropped: AtomicU64,
    runs: AtomicU64,
    /// Sum of all completed sleeps, in nanoseconds.
    slept_nanos: AtomicU64,
}

impl TickerStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks handed to the channel.
    pub fn emitted(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }

    /// Ticks discarded because the buffer was full under the drop policy.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Emission loops spawned so far.
    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::Relaxed)
    }

    pub fn total_slept(&self) -> Duration {
        Duration::from_nanos(self.slept_nanos.load(Ordering::Relaxed))
    }

    /// Mean sleep per completed cycle; zero before the first wake.
    pub fn mean_interval(&self) -> Duration {
        let cycles = self.emitted() + self.dropped();
        if cycles == 0 {
            Duration::ZERO
        } else {
            self.total_slept() / u32::try_from(cycles).unwrap_or(u32::MAX)
        }
    }

    pub(crate) fn record_run(&self) {
        self.runs.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_emitted(&self, slept: Duration) {
        self.add_sleep(slept);
        self.emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self, slept: Duration) {
        self.add_sleep(slept);
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    fn add_sleep(&self, slept: Duration) {
        let nanos = u64::try_from(slept.as_nanos()).unwrap_or(u64::MAX);
        self.slept_nanos.fetch_add(nanos, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::TickerStats;
    use std::time::Duration;

    #[test]
    fn stats_initialize_to_zero() {
        let stats = TickerStats::new();
        assert_eq!(stats.emitted(), 0);
        assert_eq!(stats.dropped(), 0);
        assert_eq!(stats.runs(), 0);
        assert_eq!(stats.total_slept(), Duration::ZERO);
        assert_eq!(stats.mean_interval(), Duration::ZERO);
    }

    #[test]
    fn mean_interval_covers_emitted_and_dropped() {
        let stats = TickerStats::new();
        stats.record_emitted(Duration::from_millis(10));
        stats.record_emitted(Duration::from_millis(30));
        stats.record_dropped(Duration::from_millis(20));
        assert_eq!(stats.emitted(), 2);
        assert_eq!(stats.dropped(), 1);
        assert_eq!(stats.total_slept(), Duration::from_millis(60));
        assert_eq!(stats.mean_interval(), Duration::from_millis(20));
    }

    #[test]
    fn runs_count_each_spawn() {
        let stats = TickerStats::new();
        stats.record_run();
        stats.record_run();
        assert_eq!(stats.runs(), 2);
    }
}
