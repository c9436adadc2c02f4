//! Authentication domain types

mod types;

pub use types::{AuthError, Credential, TokenGrant};
