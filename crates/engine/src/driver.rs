//! The synthetic HMD device.
//!
//! [`StereoDriver`] owns the shared state and the worker threads. The host
//! calls [`activate`](StereoDriver::activate) once it has assigned a device
//! index and [`deactivate`](StereoDriver::deactivate) before tearing the
//! device down; no host call is made after `deactivate` returns.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use openstereo_atomic::DriverCounters;
use openstereo_input::InputBackend;
use openstereo_profile::{ProfileStore, StereoConfig};
use openstereo_telemetry::{ReceiverConfig, SharedAttitude, TelemetryReceiver};
use parking_lot::Mutex;
use tracing::{error, info, warn};

use crate::auto_depth::{AutoDepthConfig, AutoDepthServer};
use crate::controller::ParameterController;
use crate::display::StereoDisplay;
use crate::error::{DriverError, DriverResult};
use crate::feedback::UserFeedback;
use crate::host::{DeviceIdentity, DeviceIndex, DevicePose, HostDriver, HostGate};
use crate::hotkeys::HotkeyWorker;
use crate::pose::PoseWorker;
use crate::session::{ProcessEvent, ProfileSession};
use crate::shared::LiveConfig;

/// Construction options that do not come from the profile.
#[derive(Debug, Clone, Default)]
pub struct DriverOptions {
    pub identity: DeviceIdentity,
    /// Overrides `open_track_port`
    pub telemetry_port: Option<u16>,
    /// Overrides `auto_depth_port`
    pub auto_depth_port: Option<u16>,
}

struct Worker {
    name: &'static str,
    handle: JoinHandle<()>,
}

/// One synthetic stereo HMD.
pub struct StereoDriver {
    options: DriverOptions,
    input: Arc<dyn InputBackend>,
    feedback: Arc<dyn UserFeedback>,
    live: Arc<LiveConfig>,
    counters: Arc<DriverCounters>,
    active: Arc<AtomicBool>,
    gate: Arc<HostGate>,
    controller: Arc<ParameterController>,
    session: Arc<ProfileSession>,
    display: StereoDisplay,
    attitude: Arc<SharedAttitude>,
    last_pose: Arc<Mutex<DevicePose>>,
    workers: Mutex<Vec<Worker>>,
}

impl std::fmt::Debug for StereoDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StereoDriver")
            .field("options", &self.options)
            .field("active", &self.is_active())
            .field("device", &self.gate.device())
            .finish_non_exhaustive()
    }
}

impl StereoDriver {
    pub fn new(
        host: Arc<dyn HostDriver>,
        input: Arc<dyn InputBackend>,
        store: ProfileStore,
        feedback: Arc<dyn UserFeedback>,
    ) -> Self {
        Self::with_options(host, input, store, feedback, DriverOptions::default())
    }

    /// Load the default profile from `store` and build the shared state.
    ///
    /// Profile problems are logged and the compiled-in defaults used instead;
    /// construction itself cannot fail.
    pub fn with_options(
        host: Arc<dyn HostDriver>,
        input: Arc<dyn InputBackend>,
        store: ProfileStore,
        feedback: Arc<dyn UserFeedback>,
        options: DriverOptions,
    ) -> Self {
        if let Err(e) = store.ensure_default_profile() {
            warn!(dir = %store.dir().display(), error = %e, "Could not write default profile");
        }
        let mut config = store.load_default_profile().unwrap_or_else(|e| {
            warn!(error = %e, "Default profile unusable, using built-in defaults");
            StereoConfig::default()
        });
        config.update_render_size();

        let live = Arc::new(LiveConfig::new(config));
        let counters = Arc::new(DriverCounters::new());
        let active = Arc::new(AtomicBool::new(false));
        let gate = Arc::new(HostGate::new(host, Arc::clone(&active), Arc::clone(&counters)));
        let controller = Arc::new(ParameterController::new(
            Arc::clone(&live),
            Arc::clone(&gate),
            Arc::clone(&counters),
        ));
        let session = Arc::new(ProfileSession::new(
            store,
            Arc::clone(&controller),
            Arc::clone(&feedback),
            Arc::clone(&counters),
        ));

        Self {
            options,
            input,
            feedback,
            display: StereoDisplay::new(Arc::clone(&live)),
            live,
            counters,
            active,
            gate,
            controller,
            session,
            attitude: Arc::new(SharedAttitude::new()),
            last_pose: Arc::new(Mutex::new(DevicePose::default())),
            workers: Mutex::new(Vec::new()),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Bind to `device`, push the device properties and projection, and start
    /// the worker threads.
    ///
    /// # Errors
    ///
    /// - [`DriverError::AlreadyActive`] if activated twice
    /// - [`DriverError::ThreadSpawn`] if a worker cannot be started; workers
    ///   already running are stopped again
    pub fn activate(&self, device: DeviceIndex) -> DriverResult {
        if self.active.swap(true, Ordering::AcqRel) {
            return Err(DriverError::AlreadyActive(self.gate.device().0));
        }
        self.gate.set_device(device);
        self.attitude.reset();

        let config = self.live.snapshot();
        self.live.set_auto_depth_enabled(config.auto_depth_enable);
        self.gate.push_activation_properties(&self.options.identity, &config);
        self.controller.push_projection();

        if let Err(e) = self.spawn_workers(&config) {
            error!(error = %e, severity = %e.severity(), "Activation failed");
            if let Err(stop) = self.deactivate() {
                warn!(error = %stop, "Cleanup after failed activation");
            }
            return Err(e);
        }
        info!(%device, profile = %self.live.active_profile(), "Driver activated");
        Ok(())
    }

    fn spawn_workers(&self, config: &StereoConfig) -> DriverResult {
        let mut workers = self.workers.lock();

        let pose = PoseWorker::new(
            Arc::clone(&self.live),
            Arc::clone(&self.gate),
            Arc::clone(&self.attitude),
            Arc::clone(&self.last_pose),
            Arc::clone(&self.counters),
        );
        let input = Arc::clone(&self.input);
        let active = Arc::clone(&self.active);
        let handle = thread::Builder::new()
            .name("openstereo-pose".into())
            .spawn(move || pose.run(input.as_ref(), &active))
            .map_err(|e| DriverError::thread_spawn("pose", &e))?;
        workers.push(Worker { name: "pose", handle });

        let hotkeys = HotkeyWorker::new(
            Arc::clone(&self.controller),
            Arc::clone(&self.session),
            Arc::clone(&self.feedback),
        );
        let input = Arc::clone(&self.input);
        let active = Arc::clone(&self.active);
        let counters = Arc::clone(&self.counters);
        let handle = thread::Builder::new()
            .name("openstereo-hotkeys".into())
            .spawn(move || hotkeys.run(input.as_ref(), &active, &counters))
            .map_err(|e| DriverError::thread_spawn("hotkeys", &e))?;
        workers.push(Worker {
            name: "hotkeys",
            handle,
        });

        if config.use_open_track {
            let port = self.options.telemetry_port.unwrap_or(config.open_track_port);
            let receiver = TelemetryReceiver::new(
                ReceiverConfig::with_port(port),
                Arc::clone(&self.attitude),
                Arc::clone(&self.counters),
                Arc::clone(&self.active),
            );
            let handle = receiver
                .spawn()
                .map_err(|e| DriverError::thread_spawn("telemetry", &e))?;
            workers.push(Worker {
                name: "telemetry",
                handle,
            });
        }

        let port = self.options.auto_depth_port.unwrap_or(config.auto_depth_port);
        let server = AutoDepthServer::new(
            AutoDepthConfig::with_port(port),
            Arc::clone(&self.controller),
            Arc::clone(&self.active),
        );
        let handle = server
            .spawn()
            .map_err(|e| DriverError::thread_spawn("auto-depth", &e))?;
        workers.push(Worker {
            name: "auto-depth",
            handle,
        });
        Ok(())
    }

    /// Stop every worker and release the device index.
    ///
    /// Returns once all threads have exited. Calling it on an inactive
    /// driver does nothing.
    ///
    /// # Errors
    ///
    /// [`DriverError::WorkerPanicked`] if any worker panicked; the driver is
    /// still fully stopped.
    pub fn deactivate(&self) -> DriverResult {
        self.active.store(false, Ordering::Release);
        let workers: Vec<Worker> = self.workers.lock().drain(..).collect();
        if workers.is_empty() && !self.gate.device().is_valid() {
            return Ok(());
        }

        let mut panicked = 0_usize;
        for worker in workers {
            if worker.handle.join().is_err() {
                error!(thread = worker.name, "Worker thread panicked");
                panicked = panicked.saturating_add(1);
            }
        }
        self.gate.set_device(DeviceIndex::INVALID);
        info!("Driver deactivated");

        if panicked > 0 {
            Err(DriverError::WorkerPanicked { count: panicked })
        } else {
            Ok(())
        }
    }

    /// Forward an application start/stop from the host.
    pub fn on_process_event(&self, event: &ProcessEvent) {
        self.session.on_process_event(event);
    }

    /// The display component the host queries.
    pub fn display(&self) -> &StereoDisplay {
        &self.display
    }

    /// Most recent pose computed by the pose thread.
    pub fn get_pose(&self) -> DevicePose {
        *self.last_pose.lock()
    }

    pub fn counters(&self) -> &Arc<DriverCounters> {
        &self.counters
    }

    pub fn live(&self) -> &Arc<LiveConfig> {
        &self.live
    }

    pub fn controller(&self) -> &Arc<ParameterController> {
        &self.controller
    }

    pub fn session(&self) -> &Arc<ProfileSession> {
        &self.session
    }

    /// Orientation the telemetry receiver last stored.
    pub fn attitude(&self) -> &Arc<SharedAttitude> {
        &self.attitude
    }
}

impl Drop for StereoDriver {
    fn drop(&mut self) {
        if self.is_active() {
            warn!("Driver dropped while active, stopping workers");
            if let Err(e) = self.deactivate() {
                error!(error = %e, severity = %e.severity(), "Stop on drop");
            }
        }
    }
}
