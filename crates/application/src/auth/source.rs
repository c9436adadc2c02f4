//! Where long-running operations get their bearer credential.

use async_trait::async_trait;
use trapi_domain::Credential;

use crate::error::ClientResult;

/// Supplies a credential that is valid right now.
///
/// Bulk collection asks again before every page, so an implementation
/// that renews on expiry keeps a long harvest authenticated.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Returns a credential to send with the next request.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClientError::Auth`] when no credential can be
    /// obtained.
    async fn credential(&self) -> ClientResult<Credential>;
}

/// A fixed credential, used as is until the server rejects it.
#[async_trait]
impl CredentialSource for Credential {
    async fn credential(&self) -> ClientResult<Credential> {
        Ok(self.clone())
    }
}
