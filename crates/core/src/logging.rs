//! Logging bootstrap for SentinelLink processes.
//!
//! Components log through `tracing` with structured fields
//! (`officer_id = %id`, `message_id = %id`); this module owns subscriber
//! setup so binaries and test harnesses configure it in one place.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset: engine internals at debug,
/// the websocket stack quieted to warnings.
const DEFAULT_DIRECTIVES: &str =
    "info,sentinellink_engine=debug,sentinellink_channel=debug,tungstenite=warn";

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Initialize human-readable logging for a dispatch console or officer client.
///
/// `RUST_LOG` overrides the default directives.
pub fn init() {
    tracing_subscriber::registry()
        .with(default_filter())
        .with(fmt::layer().with_target(true))
        .init();
}

/// Initialize JSON logging for aggregated deployments.
pub fn init_json() {
    tracing_subscriber::registry()
        .with(default_filter())
        .with(fmt::layer().json().with_target(true))
        .init();
}

/// Best-effort initialization for test binaries.
///
/// Multiple tests in one process race to install the subscriber; only the
/// first wins and the rest are no-ops, so every test can call this.
pub fn init_for_tests() {
    let _ = tracing_subscriber::registry()
        .with(default_filter())
        .with(fmt::layer().with_target(true).with_test_writer())
        .try_init();
}
