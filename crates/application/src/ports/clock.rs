//! Clock port

use chrono::{DateTime, Utc};

/// Source of the current time.
///
/// Credential expiry is always checked against this port so tests can pin
/// or advance time.
pub trait Clock: Send + Sync {
    /// Returns the current UTC instant.
    fn now(&self) -> DateTime<Utc>;
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}
