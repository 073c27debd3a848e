//! Command line.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Run the OpenStereo driver headlessly against a logging host.
#[derive(Debug, Clone, Parser)]
#[command(name = "openstereod", version, about)]
pub struct Args {
    /// Directory holding `default_config.json` and per-application profiles
    #[arg(short, long, default_value = "profiles")]
    pub profile_dir: PathBuf,

    /// Stop after this many seconds; otherwise run until stdin closes
    #[arg(short, long)]
    pub duration: Option<u64>,

    /// Log filter, e.g. `info` or `openstereo_engine=debug`; `RUST_LOG`
    /// takes precedence
    #[arg(short, long, default_value = "info")]
    pub log: String,

    /// UDP port for orientation telemetry, overriding the profile
    #[arg(long)]
    pub telemetry_port: Option<u16>,

    /// TCP port for the auto-depth channel, overriding the profile
    #[arg(long)]
    pub auto_depth_port: Option<u16>,

    /// Report an application as connected once the device is active
    #[arg(long)]
    pub app: Option<String>,

    /// Seconds between counter reports
    #[arg(long, default_value_t = 5)]
    pub status_interval: u64,

    /// Device index to activate on
    #[arg(long, default_value_t = 0)]
    pub device: u32,
}

impl Args {
    pub fn run_for(&self) -> Option<Duration> {
        self.duration.map(Duration::from_secs)
    }

    /// Never zero.
    pub fn status_every(&self) -> Duration {
        Duration::from_secs(self.status_interval.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn defaults() -> TestResult {
        let args = Args::try_parse_from(["openstereod"])?;
        assert_eq!(args.profile_dir, PathBuf::from("profiles"));
        assert_eq!(args.run_for(), None);
        assert_eq!(args.status_every(), Duration::from_secs(5));
        assert_eq!(args.device, 0);
        Ok(())
    }

    #[test]
    fn overrides() -> TestResult {
        let args = Args::try_parse_from([
            "openstereod",
            "--profile-dir",
            "/tmp/p",
            "-d",
            "3",
            "--telemetry-port",
            "5000",
            "--app",
            "game",
            "--status-interval",
            "0",
        ])?;
        assert_eq!(args.run_for(), Some(Duration::from_secs(3)));
        assert_eq!(args.telemetry_port, Some(5000));
        assert_eq!(args.app.as_deref(), Some("game"));
        assert_eq!(args.status_every(), Duration::from_secs(1));
        Ok(())
    }

    #[test]
    fn rejects_bad_port() {
        assert!(Args::try_parse_from(["openstereod", "--telemetry-port", "70000"]).is_err());
    }
}
