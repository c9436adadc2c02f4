//! Caller-side loops over days and pages.
//!
//! The executor fetches one page per call. This module drives it: it
//! splits date ranges into single days, follows cursors until a query is
//! done, and retries transient failures with exponential backoff.

mod harvester;
mod retry;
mod window;

pub use harvester::Harvester;
pub use retry::RetryPolicy;
pub use window::DateWindow;
