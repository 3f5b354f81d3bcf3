//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence. Without it, `default_level` is applied to the
/// calling binary, the typerace crates and `tower_http`.
///
/// Calling this more than once is harmless: later calls leave the first
/// subscriber in place.
pub fn setup_logger(bin_name: &str, default_level: &str) {
    let crate_name = bin_name.replace('-', "_");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{crate_name}={default_level},typerace_server={default_level},typerace_shared={default_level},tower_http={default_level}"
        ))
    });

    let directives = filter.to_string();

    if tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .is_ok()
    {
        tracing::debug!("Logger initialized with filter '{}'", directives);
    }
}
