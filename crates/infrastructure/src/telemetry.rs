//! Log output for binaries embedding the client.
//!
//! The library only emits `tracing` events. Call [`init`] once at startup
//! to print them; `RUST_LOG` overrides the default filter.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Installs a global fmt subscriber filtered by `RUST_LOG`, falling back to
/// [`DEFAULT_FILTER`].
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init() -> Result<(), TryInitError> {
    init_with_default(DEFAULT_FILTER)
}

/// Same as [`init`] with a caller-chosen fallback filter, e.g.
/// `"trapi_application=debug"`.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_with_default(default_filter: &str) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}
