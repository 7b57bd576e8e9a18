//! Diagnostics on stderr, so stdout only carries the running log and the
//! confirmation prompt.

use crate::args::LogLevel;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Installs the global subscriber. `RUST_LOG`, when set, wins over `level`.
pub fn init_logging(level: LogLevel) {
    let level: Level = level.into();
    let filter = EnvFilter::builder().with_default_directive(LevelFilter::from_level(level).into()).from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
