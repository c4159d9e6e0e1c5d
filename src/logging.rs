//! Logging setup.
//!
//! The library logs through `tracing` (and `log` in the fingerprint chain).
//! Binaries call [`init_logging`] once at startup; it installs a `fmt`
//! subscriber writing to stderr, so key output on stdout stays clean.
//! Records emitted through `log` are forwarded by the subscriber.
//!
//! Nothing in this crate ever logs the signing secret or a signed message.

use tracing::Level;

use crate::config::LoggingConfig;

/// Map a config level string to a `tracing` level. Unknown values map to `INFO`.
pub fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Install the global subscriber if logging is enabled.
///
/// Returns `false` when logging is disabled or a subscriber was already set.
pub fn init_logging(config: &LoggingConfig) -> bool {
    if !config.enabled {
        return false;
    }

    tracing_subscriber::fmt()
        .with_max_level(parse_level(&config.level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}
