//! OpenStereo service: hosts the driver headlessly.

pub mod args;
pub mod daemon;
pub mod host;

pub use args::Args;
pub use daemon::{Daemon, RunSummary, stop_on_stdin};
pub use host::LoggingHost;
