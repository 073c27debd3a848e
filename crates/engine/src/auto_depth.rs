//! Auto-depth side channel.
//!
//! A local client streams depth values as ASCII text over loopback TCP. Each
//! read of at most [`CHUNK_SIZE`] bytes is one value. Values are applied only
//! while auto depth is switched on (Ctrl+F11 or `auto_depth_enable`).

use std::io::{self, Read};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use openstereo_errors::TelemetryError;
use tracing::{debug, info, trace, warn};

use crate::controller::ParameterController;

/// Largest chunk read at once.
pub const CHUNK_SIZE: usize = 16;

/// Parse the longest decimal float prefix of `chunk`, the way C's `strtof`
/// reads one: leading whitespace, optional sign, digits with an optional
/// fraction, optional exponent. Trailing bytes are ignored.
///
/// Returns `None` when no digits were found or the value is not finite.
pub fn parse_depth_prefix(chunk: &[u8]) -> Option<f32> {
    let start = chunk.iter().position(|b| !b.is_ascii_whitespace())?;
    let rest = chunk.get(start..)?;
    let at = |i: usize| rest.get(i).copied();

    let mut end = 0;
    if matches!(at(end), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_digits = count_digits(rest, end);
    end += int_digits;
    let mut frac_digits = 0;
    if at(end) == Some(b'.') {
        frac_digits = count_digits(rest, end + 1);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return None;
    }
    if matches!(at(end), Some(b'e' | b'E')) {
        let mut exponent = end + 1;
        if matches!(at(exponent), Some(b'+' | b'-')) {
            exponent += 1;
        }
        let exponent_digits = count_digits(rest, exponent);
        if exponent_digits > 0 {
            end = exponent + exponent_digits;
        }
    }

    let text = std::str::from_utf8(rest.get(..end)?).ok()?;
    let value: f32 = text.parse().ok()?;
    value.is_finite().then_some(value)
}

fn count_digits(bytes: &[u8], from: usize) -> usize {
    bytes
        .get(from..)
        .map_or(0, |tail| tail.iter().take_while(|b| b.is_ascii_digit()).count())
}

/// Listener settings.
#[derive(Debug, Clone)]
pub struct AutoDepthConfig {
    pub port: u16,
    /// Sleep after a poll that found nothing
    pub idle_sleep: Duration,
    /// Wait before retrying a failed bind
    pub bind_retry: Duration,
}

impl AutoDepthConfig {
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            idle_sleep: Duration::from_millis(5),
            bind_retry: Duration::from_millis(500),
        }
    }
}

/// Loopback listener feeding [`ParameterController::adjust_depth`].
#[derive(Debug)]
pub struct AutoDepthServer {
    config: AutoDepthConfig,
    controller: Arc<ParameterController>,
    active: Arc<AtomicBool>,
}

impl AutoDepthServer {
    pub fn new(
        config: AutoDepthConfig,
        controller: Arc<ParameterController>,
        active: Arc<AtomicBool>,
    ) -> Self {
        Self {
            config,
            controller,
            active,
        }
    }

    /// Bind `127.0.0.1:port` in non-blocking mode.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::BindFailed`] if the port is taken or the
    /// listener cannot be made non-blocking.
    pub fn bind(&self) -> Result<TcpListener, TelemetryError> {
        let addr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, self.config.port));
        let bind_failed = |e: io::Error| TelemetryError::BindFailed {
            port: self.config.port,
            reason: e.to_string(),
        };
        let listener = TcpListener::bind(addr).map_err(bind_failed)?;
        listener.set_nonblocking(true).map_err(bind_failed)?;
        Ok(listener)
    }

    /// Run on a new thread, binding (and re-binding) the listener itself.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread cannot be spawned.
    pub fn spawn(self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("openstereo-auto-depth".into())
            .spawn(move || self.run())
    }

    /// Run on a new thread using an already bound listener.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the listener cannot be made non-blocking or
    /// the thread cannot be spawned.
    pub fn spawn_with_listener(self, listener: TcpListener) -> io::Result<JoinHandle<()>> {
        listener.set_nonblocking(true)?;
        thread::Builder::new()
            .name("openstereo-auto-depth".into())
            .spawn(move || self.serve(&listener))
    }

    /// Bind with retry, then serve until deactivated.
    pub fn run(&self) {
        let mut reported_bind_failure = false;
        while self.active.load(Ordering::Acquire) {
            match self.bind() {
                Ok(listener) => {
                    info!(port = self.config.port, "Auto depth listening");
                    self.serve(&listener);
                    return;
                }
                Err(e) => {
                    if !reported_bind_failure {
                        warn!(port = self.config.port, error = %e, "Auto depth bind failed, retrying");
                        reported_bind_failure = true;
                    }
                    self.sleep_while_active(self.config.bind_retry);
                }
            }
        }
    }

    /// Accept one client at a time until the active flag clears.
    pub fn serve(&self, listener: &TcpListener) {
        while self.active.load(Ordering::Acquire) {
            match listener.accept() {
                Ok((stream, peer)) => {
                    info!(%peer, "Auto depth client connected");
                    if let Err(e) = self.serve_client(stream) {
                        debug!(error = %e, "Auto depth client error");
                    }
                    info!(%peer, "Auto depth client disconnected");
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(self.config.idle_sleep);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    warn!(error = %e, "Auto depth accept failed");
                    self.sleep_while_active(self.config.bind_retry);
                }
            }
        }
        debug!("Auto depth stopped");
    }

    fn serve_client(&self, mut stream: TcpStream) -> io::Result<()> {
        stream.set_nonblocking(true)?;
        let mut buf = [0u8; CHUNK_SIZE];
        while self.active.load(Ordering::Acquire) {
            match stream.read(&mut buf) {
                Ok(0) => return Ok(()),
                Ok(len) => {
                    if let Some(chunk) = buf.get(..len) {
                        self.handle_chunk(chunk);
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(self.config.idle_sleep);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Parse one chunk and apply it if auto depth is on. Returns the depth
    /// that was committed.
    pub fn handle_chunk(&self, chunk: &[u8]) -> Option<f32> {
        let Some(value) = parse_depth_prefix(chunk) else {
            trace!(len = chunk.len(), "Ignored auto depth chunk");
            return None;
        };
        if !self.controller.live().auto_depth_enabled() {
            return None;
        }
        Some(self.controller.adjust_depth(value, false))
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

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::harness::{RecordingHost, open_gate};
    use crate::shared::LiveConfig;
    use openstereo_atomic::DriverCounters;
    use openstereo_profile::StereoConfig;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn parsed(text: &str) -> Option<u32> {
        parse_depth_prefix(text.as_bytes()).map(f32::to_bits)
    }

    #[test]
    fn parses_like_strtof() {
        assert_eq!(parsed("0.25"), Some(0.25_f32.to_bits()));
        assert_eq!(parsed("  \t-1.5xyz"), Some((-1.5_f32).to_bits()));
        assert_eq!(parsed("+.5"), Some(0.5_f32.to_bits()));
        assert_eq!(parsed("3."), Some(3.0_f32.to_bits()));
        assert_eq!(parsed("2.5e-1\n"), Some(0.25_f32.to_bits()));
        assert_eq!(parsed("4e"), Some(4.0_f32.to_bits()));
        assert_eq!(parsed("1e+"), Some(1.0_f32.to_bits()));
    }

    #[test]
    fn rejects_chunks_without_digits_or_finite_value() {
        assert_eq!(parsed(""), None);
        assert_eq!(parsed("   "), None);
        assert_eq!(parsed("."), None);
        assert_eq!(parsed("-e5"), None);
        assert_eq!(parsed("abc"), None);
        assert_eq!(parsed("1e99"), None);
        assert_eq!(parsed("inf"), None);
    }

    fn server(auto_depth_enable: bool) -> (AutoDepthServer, Arc<AtomicBool>) {
        let counters = Arc::new(DriverCounters::new());
        let gate = open_gate(Arc::new(RecordingHost::new()), Arc::clone(&counters));
        let live = Arc::new(LiveConfig::new(StereoConfig {
            auto_depth_enable,
            ..StereoConfig::default()
        }));
        let controller = Arc::new(ParameterController::new(live, gate, counters));
        let active = Arc::new(AtomicBool::new(true));
        let config = AutoDepthConfig::with_port(0);
        (AutoDepthServer::new(config, controller, Arc::clone(&active)), active)
    }

    #[test]
    fn chunks_apply_only_while_enabled() {
        let (server, _active) = server(false);
        assert_eq!(server.handle_chunk(b"0.7"), None);
        assert_eq!(server.controller.live().depth().to_bits(), 0.4_f32.to_bits());

        server.controller.live().toggle_auto_depth();
        assert_eq!(server.handle_chunk(b"0.7").map(f32::to_bits), Some(0.7_f32.to_bits()));
        assert_eq!(server.handle_chunk(b"-3").map(f32::to_bits), Some(0.0_f32.to_bits()));
        assert_eq!(server.handle_chunk(b"junk"), None);
    }

    #[test]
    fn default_config_accepts_depth_right_away() {
        let (server, _active) = server(StereoConfig::default().auto_depth_enable);
        assert_eq!(server.handle_chunk(b"0.3").map(f32::to_bits), Some(0.3_f32.to_bits()));
        assert_eq!(server.controller.live().depth().to_bits(), 0.3_f32.to_bits());
    }

    #[test]
    fn loopback_client_drives_depth() -> TestResult {
        let (server, active) = server(true);
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        let live = Arc::clone(server.controller.live());
        let handle = server.spawn_with_listener(listener)?;

        let mut client = TcpStream::connect(addr)?;
        client.write_all(b"0.125")?;
        client.flush()?;

        let deadline = Instant::now() + Duration::from_secs(5);
        while live.depth().to_bits() != 0.125_f32.to_bits() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        active.store(false, Ordering::Release);
        drop(client);
        handle.join().map_err(|e| format!("auto depth thread panicked: {e:?}"))?;

        assert_eq!(live.depth().to_bits(), 0.125_f32.to_bits());
        Ok(())
    }
}
