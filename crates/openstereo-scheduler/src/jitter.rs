//! Tick timing statistics.
//!
//! Tracks how long each tick's work took relative to the period, so the
//! service can report overruns and the busy-time tail.

/// Per-loop timing statistics.
///
/// # RT-Safety
///
/// - `record_tick` is O(1); samples go into a bounded ring buffer
/// - Percentiles reuse a scratch buffer, so they allocate only on first use
#[derive(Debug, Clone)]
pub struct JitterMetrics {
    /// Total number of ticks recorded
    pub total_ticks: u64,

    /// Ticks whose work took longer than the period
    pub overruns: u64,

    /// Longest observed busy time in nanoseconds
    pub max_busy_ns: u64,

    /// Busy time of the most recent tick
    pub last_busy_ns: u64,

    busy_sum_ns: u128,
    recent_samples: Vec<u64>,
    max_samples: usize,
    next_sample_index: usize,
    percentile_scratch: Vec<u64>,
}

impl Default for JitterMetrics {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_MAX_SAMPLES)
    }
}

impl JitterMetrics {
    const DEFAULT_MAX_SAMPLES: usize = 1_024;

    /// Create a collector with the default sample capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a collector retaining at most `max_samples` recent samples.
    pub fn with_capacity(max_samples: usize) -> Self {
        Self {
            total_ticks: 0,
            overruns: 0,
            max_busy_ns: 0,
            last_busy_ns: 0,
            busy_sum_ns: 0,
            recent_samples: Vec::with_capacity(max_samples),
            max_samples,
            next_sample_index: 0,
            percentile_scratch: Vec::with_capacity(max_samples),
        }
    }

    /// Record one tick's busy time.
    pub fn record_tick(&mut self, busy_ns: u64, overrun: bool) {
        self.total_ticks = self.total_ticks.saturating_add(1);
        if overrun {
            self.overruns = self.overruns.saturating_add(1);
        }
        self.max_busy_ns = self.max_busy_ns.max(busy_ns);
        self.last_busy_ns = busy_ns;
        self.busy_sum_ns = self.busy_sum_ns.saturating_add(u128::from(busy_ns));

        if self.max_samples == 0 {
            return;
        }

        if self.recent_samples.len() < self.max_samples {
            self.recent_samples.push(busy_ns);
        } else if let Some(slot) = self.recent_samples.get_mut(self.next_sample_index) {
            *slot = busy_ns;
            self.next_sample_index = (self.next_sample_index + 1) % self.max_samples;
        }
    }

    /// Mean busy time in nanoseconds.
    pub fn mean_busy_ns(&self) -> u64 {
        if self.total_ticks == 0 {
            return 0;
        }
        u64::try_from(self.busy_sum_ns / u128::from(self.total_ticks)).unwrap_or(u64::MAX)
    }

    /// p99 busy time over the retained samples.
    pub fn p99_busy_ns(&mut self) -> u64 {
        self.percentile_busy_ns(0.99)
    }

    /// Arbitrary percentile (0.0 to 1.0) over the retained samples.
    pub fn percentile_busy_ns(&mut self, percentile: f64) -> u64 {
        if self.recent_samples.is_empty() {
            return 0;
        }
        let percentile = percentile.clamp(0.0, 1.0);

        self.percentile_scratch.clear();
        self.percentile_scratch
            .extend_from_slice(&self.recent_samples);

        let len = self.percentile_scratch.len();
        let index = ((len as f64 * percentile) as usize).min(len.saturating_sub(1));
        let (_, value, _) = self.percentile_scratch.select_nth_unstable(index);
        *value
    }

    /// Fraction of ticks that overran (0.0 to 1.0).
    pub fn overrun_rate(&self) -> f64 {
        if self.total_ticks == 0 {
            return 0.0;
        }
        self.overruns as f64 / self.total_ticks as f64
    }

    /// Reset all statistics.
    pub fn reset(&mut self) {
        *self = Self::with_capacity(self.max_samples);
    }
}
