//! Tracing setup for the command line.

use crate::context::VerbosityLevel;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs a stderr subscriber. `RUST_LOG` overrides the `-v` level.
pub fn init(verbosity: VerbosityLevel) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.filter()));

    let result = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();

    if let Err(e) = result {
        eprintln!("Failed to initialize logging: {}", e);
    }
}
