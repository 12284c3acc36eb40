//! Tracing setup for binaries and tests that embed the runtime.
//!
//! The library itself only emits `tracing` events; installing a subscriber is left to the
//! host. [`init`] is a convenience for hosts that have no subscriber of their own.

use tracing_subscriber::{fmt, EnvFilter};

use crate::{Error, Result};

/// Installs a compact global subscriber
///
/// `RUST_LOG` takes precedence over `default_directive` (e.g. `"sensor_poller=info"`).
///
/// # Errors
///
/// Fails if the directive does not parse or a global subscriber is already set.
pub fn init(default_directive: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive)
            .map_err(|e| Error::invalid_config(format!("log directive {:?}: {}", default_directive, e)))?,
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| Error::task(format!("failed to install tracing subscriber: {}", e)))
}
