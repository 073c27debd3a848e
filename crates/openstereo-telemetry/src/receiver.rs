//! Receiver thread.
//!
//! Polls a non-blocking UDP socket until the shared active flag clears. The
//! socket never blocks the caller: an empty poll sleeps 1 ms, a failed bind
//! is retried after a backoff.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use openstereo_atomic::DriverCounters;
use openstereo_errors::TelemetryError;
use tracing::{debug, info, warn};

use crate::DEFAULT_PORT;
use crate::attitude::SharedAttitude;
use crate::packet::parse_packet;

/// Larger than a packet so oversized datagrams are seen at their real size
/// instead of being truncated to a valid-looking 48 bytes.
const RECV_BUFFER_SIZE: usize = 512;

/// Receiver settings.
#[derive(Debug, Clone)]
pub struct ReceiverConfig {
    /// Interface to bind, `0.0.0.0` by default
    pub bind_addr: Ipv4Addr,
    pub port: u16,
    /// Sleep after a poll that found nothing
    pub idle_sleep: Duration,
    /// Wait before retrying a failed bind
    pub bind_retry: Duration,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            bind_addr: Ipv4Addr::UNSPECIFIED,
            port: DEFAULT_PORT,
            idle_sleep: Duration::from_millis(1),
            bind_retry: Duration::from_secs(1),
        }
    }
}

impl ReceiverConfig {
    /// Default settings on `port`.
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Self::default()
        }
    }
}

/// Feeds [`SharedAttitude`] from the UDP orientation stream.
#[derive(Debug)]
pub struct TelemetryReceiver {
    config: ReceiverConfig,
    attitude: Arc<SharedAttitude>,
    counters: Arc<DriverCounters>,
    active: Arc<AtomicBool>,
}

impl TelemetryReceiver {
    pub fn new(
        config: ReceiverConfig,
        attitude: Arc<SharedAttitude>,
        counters: Arc<DriverCounters>,
        active: Arc<AtomicBool>,
    ) -> Self {
        Self {
            config,
            attitude,
            counters,
            active,
        }
    }

    /// Bind the configured address in non-blocking mode.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::BindFailed`] if the socket cannot be bound or
    /// switched to non-blocking mode.
    pub fn bind(&self) -> Result<UdpSocket, TelemetryError> {
        let addr = SocketAddr::V4(SocketAddrV4::new(self.config.bind_addr, self.config.port));
        let bind_failed = |e: io::Error| TelemetryError::BindFailed {
            port: self.config.port,
            reason: e.to_string(),
        };
        let socket = UdpSocket::bind(addr).map_err(bind_failed)?;
        socket.set_nonblocking(true).map_err(bind_failed)?;
        Ok(socket)
    }

    /// Run on a new thread, binding (and re-binding) the socket itself.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread cannot be spawned.
    pub fn spawn(self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("openstereo-telemetry".into())
            .spawn(move || self.run())
    }

    /// Run on a new thread using an already bound socket.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the socket cannot be made non-blocking or the
    /// thread cannot be spawned.
    pub fn spawn_with_socket(self, socket: UdpSocket) -> io::Result<JoinHandle<()>> {
        socket.set_nonblocking(true)?;
        thread::Builder::new()
            .name("openstereo-telemetry".into())
            .spawn(move || self.serve(&socket))
    }

    /// Bind with retry, then serve until deactivated.
    pub fn run(&self) {
        self.attitude.reset();
        let mut reported_bind_failure = false;
        while self.active.load(Ordering::Acquire) {
            match self.bind() {
                Ok(socket) => {
                    info!(port = self.config.port, "Orientation telemetry listening");
                    self.serve(&socket);
                    return;
                }
                Err(e) => {
                    if !reported_bind_failure {
                        warn!(port = self.config.port, error = %e, "Orientation telemetry bind failed, retrying");
                        reported_bind_failure = true;
                    }
                    self.sleep_while_active(self.config.bind_retry);
                }
            }
        }
    }

    /// Poll `socket` until the active flag clears.
    pub fn serve(&self, socket: &UdpSocket) {
        let mut buf = [0u8; RECV_BUFFER_SIZE];
        let mut reported_recv_error = false;
        while self.active.load(Ordering::Acquire) {
            match socket.recv_from(&mut buf) {
                Ok((len, _from)) => {
                    if let Some(datagram) = buf.get(..len) {
                        self.handle_datagram(datagram);
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(self.config.idle_sleep);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    if !reported_recv_error {
                        warn!(error = %e, "Orientation telemetry receive error");
                        reported_recv_error = true;
                    }
                    thread::sleep(self.config.idle_sleep);
                }
            }
        }
        debug!("Orientation telemetry stopped");
    }

    /// Decode one datagram and publish it. Returns whether it was accepted.
    pub fn handle_datagram(&self, datagram: &[u8]) -> bool {
        match parse_packet(datagram) {
            Ok(sample) => {
                self.attitude.set(sample.orientation());
                self.counters.inc_telemetry_received();
                true
            }
            Err(e) => {
                debug!(error = %e, "Dropped orientation sample");
                self.counters.inc_telemetry_dropped();
                false
            }
        }
    }

    fn sleep_while_active(&self, total: Duration) {
        let deadline = Instant::now() + total;
        let slice = Duration::from_millis(20);
        while self.active.load(Ordering::Acquire) {
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                break;
            }
            thread::sleep(left.min(slice));
        }
    }
}
