//! OpenStereo service daemon (openstereod)

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::{Context, Result};
use clap::Parser;
use openstereo_engine::HostDriver;
use openstereo_service::{Args, Daemon, LoggingHost, stop_on_stdin};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        profile_dir = %args.profile_dir.display(),
        "Starting OpenStereo service"
    );

    let stop = Arc::new(AtomicBool::new(false));
    if args.run_for().is_none() {
        stop_on_stdin(Arc::clone(&stop)).context("starting stdin watcher")?;
    }

    let host = Arc::new(LoggingHost::new());
    let summary = Daemon::new(args).run_with(Arc::clone(&host) as Arc<dyn HostDriver>, &stop)?;
    info!(
        pose_ticks = summary.pose_ticks,
        poses_received = host.pose_count(),
        projections = summary.projection_updates,
        profile_loads = summary.profile_loads,
        "Service stopped"
    );
    Ok(())
}
