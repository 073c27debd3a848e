//! End-to-end delivery over a loopback socket.

use std::net::UdpSocket;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use glam::Quat;
use openstereo_atomic::DriverCounters;
use openstereo_telemetry::{
    OpenTrackSample, ReceiverConfig, SharedAttitude, TelemetryReceiver, parse_packet,
};
use proptest::prelude::*;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn wait_for(deadline: Duration, mut done: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    done()
}

#[test]
fn sample_reaches_shared_attitude() -> TestResult {
    let attitude = Arc::new(SharedAttitude::new());
    let counters = Arc::new(DriverCounters::new());
    let active = Arc::new(AtomicBool::new(true));

    let socket = UdpSocket::bind("127.0.0.1:0")?;
    let target = socket.local_addr()?;
    let receiver = TelemetryReceiver::new(
        ReceiverConfig::with_port(target.port()),
        Arc::clone(&attitude),
        Arc::clone(&counters),
        Arc::clone(&active),
    );
    let handle = receiver.spawn_with_socket(socket)?;

    let sender = UdpSocket::bind("127.0.0.1:0")?;
    sender.send_to(&[0u8; 12], target)?;
    let sample = OpenTrackSample {
        yaw: -45.0,
        pitch: 10.0,
        ..Default::default()
    };
    sender.send_to(&sample.to_bytes(), target)?;

    let delivered = wait_for(Duration::from_secs(2), || {
        counters.telemetry_packets_received() == 1
    });
    active.store(false, Ordering::Release);
    handle
        .join()
        .map_err(|e| format!("receiver thread panicked: {e:?}"))?;

    assert!(delivered);
    assert_eq!(counters.telemetry_packets_dropped(), 1);
    assert!(attitude.get().abs_diff_eq(sample.orientation(), 1e-6));
    Ok(())
}

#[test]
fn bind_conflict_is_reported() -> TestResult {
    let holder = UdpSocket::bind("127.0.0.1:0")?;
    let port = holder.local_addr()?.port();
    let receiver = TelemetryReceiver::new(
        ReceiverConfig {
            bind_addr: std::net::Ipv4Addr::LOCALHOST,
            ..ReceiverConfig::with_port(port)
        },
        Arc::new(SharedAttitude::new()),
        Arc::new(DriverCounters::new()),
        Arc::new(AtomicBool::new(true)),
    );
    assert!(receiver.bind().is_err());
    Ok(())
}

proptest! {
    #[test]
    fn decoded_orientation_is_unit(yaw in -180.0f64..180.0, pitch in -90.0f64..90.0, roll in -180.0f64..180.0) {
        let sample = OpenTrackSample { yaw, pitch, roll, ..Default::default() };
        let decoded = parse_packet(&sample.to_bytes());
        prop_assert_eq!(decoded, Ok(sample));
        let q: Quat = sample.orientation();
        prop_assert!((q.length() - 1.0).abs() < 1e-5);
    }
}
