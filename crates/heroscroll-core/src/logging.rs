#![forbid(unsafe_code)]

//! Log setup for native hosts.
//!
//! The controller only emits `tracing` events; installing a subscriber is
//! the host's job. Browser hosts forward to the console from the web crate.
//! Native hosts (replay tools, test runners) can use
//! [`init_json_subscriber`] behind the `tracing-json` feature.
//!
//! Targets of interest:
//!
//! - `heroscroll_core::controller`: state edges at `debug`, per-event
//!   arbitration at `trace`.

/// Environment variable checked before `RUST_LOG`.
pub const LOG_ENV: &str = "HEROSCROLL_LOG";

/// Resolve the filter directive: `HEROSCROLL_LOG`, then `RUST_LOG`, then
/// `default`.
#[must_use]
pub fn filter_directive(default: &str) -> String {
    [LOG_ENV, "RUST_LOG"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Install a global JSON subscriber filtered by [`filter_directive`].
///
/// Fails if a global subscriber is already set.
#[cfg(feature = "tracing-json")]
pub fn init_json_subscriber(
    default: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter = tracing_subscriber::EnvFilter::try_new(filter_directive(default))?;
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
}
