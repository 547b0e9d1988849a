//! Telemetry and Observability
//!
//! Sets up `tracing-subscriber` for structured logging. `RUST_LOG` always
//! wins; otherwise the config-driven level applies. Debug builds get
//! pretty terminal output, release builds JSON.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Level used before configuration has been loaded
const BOOTSTRAP_LEVEL: &str = "info";

/// Initialize the tracing subscriber with the given default log level.
///
/// Safe to call more than once; only the first call installs a
/// subscriber, later calls are no-ops.
pub fn init_telemetry_with_level(log_level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{log_level},steward={log_level}")));

    #[cfg(debug_assertions)]
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().pretty().with_target(false))
        .try_init()
        .ok();

    #[cfg(not(debug_assertions))]
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().json().with_current_span(true))
        .try_init()
        .ok();
}

/// Initialize telemetry before configuration is available.
pub fn init_telemetry() {
    init_telemetry_with_level(BOOTSTRAP_LEVEL);
}
