//! Fixed-period tick scheduler.

use std::time::{Duration, Instant};

use crate::error::{SchedulerError, SchedulerResult};
use crate::jitter::JitterMetrics;
use crate::sleep::PlatformSleep;
use crate::{MIN_POLL_PERIOD_NS, NANOS_PER_SEC};

/// Timing of the tick that just began.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInfo {
    /// 1-based tick counter
    pub tick: u64,
    /// Measured wall-clock time since the previous tick began.
    /// Zero on the first tick.
    pub delta: Duration,
}

impl TickInfo {
    /// Measured delta in seconds.
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Whether this is the first tick since the scheduler started.
    pub fn is_first(&self) -> bool {
        self.tick == 1
    }
}

/// Drives a worker loop at a fixed nominal period.
///
/// Unlike an absolute-deadline scheduler, a late tick does not try to catch
/// up: the next tick is simply `period` after the current one started, or
/// immediately if the work overran.
///
/// ```no_run
/// use std::time::Duration;
/// use openstereo_scheduler::TickScheduler;
///
/// # fn main() -> Result<(), openstereo_scheduler::SchedulerError> {
/// let mut scheduler = TickScheduler::with_period(Duration::from_millis(8))?;
/// for _ in 0..10 {
///     let tick = scheduler.begin_tick();
///     let _dt = tick.delta_secs();
///     scheduler.end_tick();
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TickScheduler {
    period: Duration,
    tick_count: u64,
    last_tick: Option<Instant>,
    tick_start: Option<Instant>,
    metrics: JitterMetrics,
    platform_sleep: PlatformSleep,
}

impl TickScheduler {
    /// Create a scheduler with the given period.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::ZeroPeriod`] for a zero duration.
    pub fn with_period(period: Duration) -> SchedulerResult<Self> {
        if period.is_zero() {
            return Err(SchedulerError::ZeroPeriod);
        }
        Ok(Self {
            period,
            tick_count: 0,
            last_tick: None,
            tick_start: None,
            metrics: JitterMetrics::new(),
            platform_sleep: PlatformSleep::new(),
        })
    }

    /// Create a scheduler ticking at `hz`.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidFrequency`] if `hz` is not positive and finite.
    pub fn from_frequency_hz(hz: f32) -> SchedulerResult<Self> {
        Self::with_period(period_for_frequency(hz)?)
    }

    /// Create a scheduler ticking at `hz`, but never faster than 125 Hz.
    ///
    /// Used by loops that poll a physical device each tick.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidFrequency`] if `hz` is not positive and finite.
    pub fn polling_at(hz: f32) -> SchedulerResult<Self> {
        let period = period_for_frequency(hz)?.max(Duration::from_nanos(MIN_POLL_PERIOD_NS));
        Self::with_period(period)
    }

    /// Nominal period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Number of ticks begun so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Timing statistics.
    pub fn metrics(&self) -> &JitterMetrics {
        &self.metrics
    }

    /// Mutable timing statistics, for percentile queries.
    pub fn metrics_mut(&mut self) -> &mut JitterMetrics {
        &mut self.metrics
    }

    /// Mark the start of a tick and measure the delta since the previous one.
    pub fn begin_tick(&mut self) -> TickInfo {
        let now = Instant::now();
        let delta = self
            .last_tick
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last_tick = Some(now);
        self.tick_start = Some(now);
        self.tick_count = self.tick_count.saturating_add(1);
        TickInfo {
            tick: self.tick_count,
            delta,
        }
    }

    /// Finish the tick: sleep out the remainder of the period.
    ///
    /// Returns `true` if the tick's work overran the period, in which case no
    /// sleep happens.
    pub fn end_tick(&mut self) -> bool {
        let Some(start) = self.tick_start.take() else {
            return false;
        };
        let spent = start.elapsed();
        let overrun = spent >= self.period;
        let busy_ns = u64::try_from(spent.as_nanos()).unwrap_or(u64::MAX);
        self.metrics.record_tick(busy_ns, overrun);

        if !overrun {
            self.platform_sleep
                .sleep_for(self.period.saturating_sub(spent));
        }
        overrun
    }
}

/// Convert a frequency to a period.
///
/// # Errors
///
/// Returns [`SchedulerError::InvalidFrequency`] if `hz` is not positive and finite.
pub fn period_for_frequency(hz: f32) -> SchedulerResult<Duration> {
    if !hz.is_finite() || hz <= 0.0 {
        return Err(SchedulerError::InvalidFrequency(hz));
    }
    let nanos = (NANOS_PER_SEC as f64 / f64::from(hz)).round();
    if nanos < 1.0 {
        return Err(SchedulerError::InvalidFrequency(hz));
    }
    Ok(Duration::from_nanos(nanos as u64))
}
