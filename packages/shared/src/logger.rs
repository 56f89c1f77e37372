//! Logging setup utilities for the Bounce game server.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// This function sets up logging for the application crate and for the HTTP
/// tracing layer. The log level can be overridden using the `RUST_LOG`
/// environment variable.
///
/// # Arguments
///
/// * `crate_name` - The name of the crate to log for (e.g., "bounce-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use bounce_shared::logger::setup_logger;
///
/// setup_logger("bounce-server", "debug");
/// ```
pub fn setup_logger(crate_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(crate_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn default_filter(crate_name: &str, default_log_level: &str) -> String {
    format!(
        "{}={},tower_http={}",
        crate_name.replace('-', "_"),
        default_log_level,
        default_log_level
    )
}
