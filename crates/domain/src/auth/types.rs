//! Credential and token grant types

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Token type assumed when the authorization endpoint omits one.
const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// Raw body returned by the client-credentials token endpoint.
///
/// Every member is optional so that a malformed grant can be reported as
/// an [`AuthError`] instead of a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    /// The issued access token.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Lifetime of the token in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Token type, usually `Bearer`.
    #[serde(default)]
    pub token_type: Option<String>,
    /// Granted scopes, comma or whitespace separated.
    #[serde(default)]
    pub scope: Option<String>,
    /// Error code when the grant was refused.
    #[serde(default)]
    pub error: Option<String>,
    /// Human readable description of `error`.
    #[serde(default)]
    pub error_description: Option<String>,
    /// Server log identifier for support requests.
    #[serde(default)]
    pub log_id: Option<String>,
}

/// Bearer credential obtained through a client-credentials exchange.
///
/// A credential is never mutated. When it expires, a fresh authentication
/// produces a new one.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// The opaque access token.
    pub access_token: String,
    /// Token type used as the `Authorization` scheme.
    pub token_type: String,
    /// Instant after which the credential must not be used.
    pub expires_at: DateTime<Utc>,
    /// Scopes granted by this credential.
    #[serde(default)]
    pub scope: BTreeSet<String>,
    /// When the credential was obtained.
    pub obtained_at: DateTime<Utc>,
}

impl Credential {
    /// Builds a credential from a grant received at `obtained_at`.
    ///
    /// `expires_at` is `obtained_at + expires_in - margin`, where the margin
    /// is capped at half of `expires_in` so a fresh credential is always
    /// valid at the moment it is issued.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Denied`] when the grant carries an `error`
    /// member and [`AuthError::MalformedGrant`] when `access_token` or a
    /// positive `expires_in` is missing.
    pub fn from_grant(
        grant: TokenGrant,
        obtained_at: DateTime<Utc>,
        margin: Duration,
    ) -> Result<Self, AuthError> {
        if let Some(error) = grant.error {
            return Err(AuthError::Denied {
                error,
                description: grant.error_description,
                log_id: grant.log_id,
            });
        }

        let access_token = grant
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AuthError::malformed("missing access_token"))?;

        let expires_in = grant
            .expires_in
            .ok_or_else(|| AuthError::malformed("missing expires_in"))?;
        if expires_in <= 0 {
            return Err(AuthError::malformed(format!(
                "expires_in must be positive, got {expires_in}"
            )));
        }

        let out_of_range =
            || AuthError::malformed(format!("expires_in is out of range: {expires_in}"));
        let lifetime = Duration::try_seconds(expires_in).ok_or_else(out_of_range)?;
        let margin = margin.max(Duration::zero()).min(lifetime / 2);
        let expires_at = obtained_at
            .checked_add_signed(lifetime - margin)
            .ok_or_else(out_of_range)?;

        let scope = grant
            .scope
            .map(|s| {
                s.split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|part| !part.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            access_token,
            token_type: grant
                .token_type
                .unwrap_or_else(|| DEFAULT_TOKEN_TYPE.to_string()),
            expires_at,
            scope,
            obtained_at,
        })
    }

    /// Returns true while `now` is before `expires_at`.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Complement of [`Credential::is_valid_at`].
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_valid_at(now)
    }

    /// Seconds left until expiry, negative once expired.
    #[must_use]
    pub fn seconds_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds()
    }

    /// Returns true if the credential grants `scope`.
    #[must_use]
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scope.contains(scope)
    }

    /// Returns the `Authorization` header value.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }

    /// Short, log-safe preview of the access token.
    #[must_use]
    pub fn token_preview(&self) -> String {
        if self.access_token.chars().count() > 12 {
            let head: String = self.access_token.chars().take(8).collect();
            format!("{head}...")
        } else {
            "***".to_string()
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &self.token_preview())
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .field("scope", &self.scope)
            .field("obtained_at", &self.obtained_at)
            .finish()
    }
}

/// Authentication errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The authorization endpoint answered with a non-success status,
    /// or an API endpoint rejected the bearer credential.
    #[error("authorization rejected with status {status}: {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body or error description.
        message: String,
    },

    /// The authorization endpoint refused the grant in a success response.
    #[error("authorization denied: {error} ({})", .description.as_deref().unwrap_or("no description"))]
    Denied {
        /// Error code.
        error: String,
        /// Optional description.
        description: Option<String>,
        /// Optional server log identifier.
        log_id: Option<String>,
    },

    /// The grant body could not be turned into a credential.
    #[error("malformed token grant: {reason}")]
    MalformedGrant {
        /// What was wrong with the body.
        reason: String,
    },

    /// The token request never produced a response.
    #[error("network error during authentication: {message}")]
    Network {
        /// Error description.
        message: String,
    },
}

impl AuthError {
    /// Returns true when the token endpoint may succeed if asked again:
    /// no response at all, 429 or a 5xx.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Rejected { status, .. } => matches!(*status, 429 | 500..=599),
            Self::Denied { .. } | Self::MalformedGrant { .. } => false,
        }
    }

    fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedGrant {
            reason: reason.into(),
        }
    }
}
