//! Driver lifetime for the headless service.

use std::io::{self, BufRead};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use openstereo_engine::{
    DeviceIndex, DriverOptions, HostDriver, ProcessEvent, StereoDriver, TracingFeedback,
};
use openstereo_input::NullInput;
use openstereo_profile::ProfileStore;
use tracing::{info, warn};

use crate::args::Args;

const POLL: Duration = Duration::from_millis(50);

/// Counters accumulated over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub pose_ticks: u64,
    pub projection_updates: u64,
    pub profile_loads: u64,
}

/// Runs one [`StereoDriver`] from activation to shutdown.
#[derive(Debug)]
pub struct Daemon {
    args: Args,
}

impl Daemon {
    pub fn new(args: Args) -> Self {
        Self { args }
    }

    /// Run against `host` until the configured duration elapses or `stop`
    /// is set.
    ///
    /// # Errors
    ///
    /// Fails if the profile directory cannot be created or the driver does
    /// not activate or stop cleanly.
    pub fn run_with(&self, host: Arc<dyn HostDriver>, stop: &AtomicBool) -> Result<RunSummary> {
        std::fs::create_dir_all(&self.args.profile_dir).with_context(|| {
            format!("creating profile directory {}", self.args.profile_dir.display())
        })?;

        let driver = StereoDriver::with_options(
            host,
            Arc::new(NullInput),
            ProfileStore::new(&self.args.profile_dir),
            Arc::new(TracingFeedback::new()),
            DriverOptions {
                telemetry_port: self.args.telemetry_port,
                auto_depth_port: self.args.auto_depth_port,
                ..DriverOptions::default()
            },
        );
        driver
            .activate(DeviceIndex(self.args.device))
            .context("activating driver")?;

        if let Some(app) = &self.args.app {
            driver.on_process_event(&ProcessEvent::Connected { name: app.clone() });
        }

        let mut summary = RunSummary::default();
        let started = Instant::now();
        let mut last_report = started;
        loop {
            if stop.load(Ordering::Acquire) {
                info!("Stop requested");
                break;
            }
            if let Some(limit) = self.args.run_for()
                && started.elapsed() >= limit
            {
                break;
            }
            if last_report.elapsed() >= self.args.status_every() {
                report(&driver, &mut summary);
                last_report = Instant::now();
            }
            thread::sleep(POLL);
        }

        if let Some(app) = &self.args.app {
            driver.on_process_event(&ProcessEvent::Disconnected { name: app.clone() });
        }
        driver.deactivate().context("stopping driver")?;
        report(&driver, &mut summary);
        Ok(summary)
    }
}

fn report(driver: &StereoDriver, summary: &mut RunSummary) {
    let snapshot = driver.counters().snapshot_and_reset();
    summary.pose_ticks = summary.pose_ticks.saturating_add(snapshot.pose_ticks);
    summary.projection_updates = summary
        .projection_updates
        .saturating_add(snapshot.projection_updates);
    summary.profile_loads = summary.profile_loads.saturating_add(snapshot.profile_loads);

    if snapshot.pose_overruns > 0 || snapshot.telemetry_packets_dropped > 0 {
        warn!(
            overruns = snapshot.pose_overruns,
            dropped = snapshot.telemetry_packets_dropped,
            "Driver degraded"
        );
    }
    info!(
        pose_ticks = snapshot.pose_ticks,
        input_ticks = snapshot.input_ticks,
        projections = snapshot.projection_updates,
        depth_updates = snapshot.depth_updates,
        telemetry = snapshot.telemetry_packets_received,
        profile_loads = snapshot.profile_loads,
        depth = driver.live().depth(),
        convergence = driver.live().convergence(),
        "Status"
    );
}

/// Set `stop` once stdin reaches end of file or a line is entered.
///
/// The reader thread is detached; it is blocked in `read` for as long as
/// the process runs.
///
/// # Errors
///
/// Returns the OS error if the thread cannot be spawned.
pub fn stop_on_stdin(stop: Arc<AtomicBool>) -> io::Result<()> {
    thread::Builder::new()
        .name("openstereo-stdin".into())
        .spawn(move || {
            let mut line = String::new();
            if let Err(e) = io::stdin().lock().read_line(&mut line) {
                warn!(error = %e, "stdin unreadable");
            }
            stop.store(true, Ordering::Release);
        })
        .map(drop)
}
