//! Authentication
//!
//! Client-credentials exchange, credential validity checks and the
//! source bulk collection draws credentials from.

mod source;
mod token_manager;

pub use source::CredentialSource;
pub use token_manager::{
    ClientCredentials, DEFAULT_EXPIRY_MARGIN_SECS, DEFAULT_TOKEN_URL, TokenManager,
    TokenRequestHeaders,
};
