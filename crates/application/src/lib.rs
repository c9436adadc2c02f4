//! trapi Application - Use cases and ports
//!
//! This crate defines the application layer with:
//! - Port traits for the HTTP transport and the clock
//! - Token acquisition and renewal
//! - Single-page execution against every research endpoint
//! - Day partitioning, pagination and retry for bulk collection

pub mod auth;
pub mod client;
pub mod error;
pub mod executor;
pub mod harvest;
pub mod ports;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, missing_docs)]
mod test_support;

pub use auth::{
    ClientCredentials, CredentialSource, DEFAULT_EXPIRY_MARGIN_SECS, DEFAULT_TOKEN_URL,
    TokenManager, TokenRequestHeaders,
};
pub use client::ResearchClient;
pub use error::{ClientError, ClientResult, RequestError, TransientError};
pub use executor::{
    DEFAULT_BASE_URL, ObjectEndpoint, PageExecutor, PagedEndpoint, PlaylistLookup, UserFollowers,
    UserFollowing, UserInfoLookup, UserLikedVideos, UserPinnedVideos, UserRepostedVideos,
    VideoComments, VideoSearch,
};
pub use harvest::{DateWindow, Harvester, RetryPolicy};
pub use ports::{
    Clock, HttpMethod, HttpTransport, TransportBody, TransportError, TransportRequest,
    TransportResponse,
};
