//! Process-wide log setup.
//!
//! Library code logs through `log` macros and `tracing` spans; this wires
//! both into one `tracing-subscriber` registry.

use tracing::Subscriber;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Installs the global subscriber. `RUST_LOG` overrides `config.level`.
///
/// Returns `false` when a subscriber was already installed; the existing
/// one is left in place.
pub fn init(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let registry = tracing_subscriber::registry().with(filter);
    let subscriber: Box<dyn Subscriber + Send + Sync> = if config.json {
        Box::new(registry.with(fmt::layer().json().with_target(true)))
    } else {
        Box::new(registry.with(fmt::layer().with_target(true)))
    };

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return false;
    }

    // Bridge `log` records into tracing.
    let _ = tracing_log::LogTracer::init();
    true
}
