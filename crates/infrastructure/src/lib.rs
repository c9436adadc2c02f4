//! trapi Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus configuration loading,
//! log setup and a ready-wired session.

pub mod adapters;
pub mod config;
pub mod session;
pub mod telemetry;

pub use adapters::{ReqwestTransport, SystemClock};
pub use config::{ClientConfig, ConfigError, CredentialSettings, RetrySettings};
pub use session::{ResearchSession, SessionError};
