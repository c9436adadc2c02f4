//! Client-credentials token lifecycle.
//!
//! The manager exchanges a client key and secret for a bearer
//! [`Credential`] and answers validity questions against its [`Clock`].
//! It never refreshes on its own: renewing is just another call to
//! [`TokenManager::authenticate`]. Concurrent callers may each renew; the
//! last credential wins and all of them are valid.

use std::fmt;

use chrono::Duration;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, instrument};
use trapi_domain::{AuthError, Credential, TokenGrant};

use crate::ports::{Clock, HttpTransport, TransportRequest, TransportResponse};

/// Default authorization endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://open.tiktokapis.com/v2/oauth/token/";

/// Default safety margin subtracted from the server-reported lifetime.
pub const DEFAULT_EXPIRY_MARGIN_SECS: i64 = 60;

const GRANT_TYPE: &str = "client_credentials";

/// Client key and secret registered for the research API.
#[derive(Clone)]
pub struct ClientCredentials {
    client_key: String,
    client_secret: SecretString,
}

impl ClientCredentials {
    /// Creates credentials. The secret is only exposed when the form body
    /// is encoded.
    #[must_use]
    pub fn new(client_key: impl Into<String>, client_secret: SecretString) -> Self {
        Self {
            client_key: client_key.into(),
            client_secret,
        }
    }

    /// The public client key.
    #[must_use]
    pub fn client_key(&self) -> &str {
        &self.client_key
    }

    fn form(&self) -> Vec<(String, String)> {
        vec![
            ("client_key".to_string(), self.client_key.clone()),
            (
                "client_secret".to_string(),
                self.client_secret.expose_secret().to_string(),
            ),
            ("grant_type".to_string(), GRANT_TYPE.to_string()),
        ]
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_key", &self.client_key)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// Headers sent with the token request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRequestHeaders {
    /// `Content-Type` value.
    pub content_type: String,
    /// `Cache-Control` value.
    pub cache_control: String,
}

impl Default for TokenRequestHeaders {
    fn default() -> Self {
        Self {
            content_type: "application/x-www-form-urlencoded".to_string(),
            cache_control: "no-cache".to_string(),
        }
    }
}

/// Acquires and checks bearer credentials.
pub struct TokenManager<T, C> {
    transport: T,
    clock: C,
    token_url: String,
    expiry_margin: Duration,
    headers: TokenRequestHeaders,
}

impl<T: HttpTransport, C: Clock> TokenManager<T, C> {
    /// Creates a manager for the default authorization endpoint.
    pub fn new(transport: T, clock: C) -> Self {
        Self {
            transport,
            clock,
            token_url: DEFAULT_TOKEN_URL.to_string(),
            expiry_margin: Duration::seconds(DEFAULT_EXPIRY_MARGIN_SECS),
            headers: TokenRequestHeaders::default(),
        }
    }

    /// Overrides the authorization endpoint.
    #[must_use]
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Overrides the expiry margin. It is still capped at half of each
    /// credential's lifetime.
    #[must_use]
    pub fn with_expiry_margin(mut self, margin: Duration) -> Self {
        self.expiry_margin = margin;
        self
    }

    /// Overrides the token request headers.
    #[must_use]
    pub fn with_headers(mut self, headers: TokenRequestHeaders) -> Self {
        self.headers = headers;
        self
    }

    /// Configured authorization endpoint.
    #[must_use]
    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Exchanges client credentials for a bearer credential.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Network`] when no response was received,
    /// [`AuthError::Rejected`] for a non-2xx status,
    /// [`AuthError::Denied`] when a 2xx body carries an `error` member and
    /// [`AuthError::MalformedGrant`] when the body lacks a usable token.
    #[instrument(skip_all, fields(url = %self.token_url, client_key = %credentials.client_key))]
    pub async fn authenticate(
        &self,
        credentials: &ClientCredentials,
    ) -> Result<Credential, AuthError> {
        let request = TransportRequest::post(self.token_url.clone())
            .with_header("Content-Type", self.headers.content_type.clone())
            .with_header("Cache-Control", self.headers.cache_control.clone())
            .with_form(credentials.form());

        debug!("requesting client credentials token");
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| AuthError::Network {
                message: e.to_string(),
            })?;
        debug!(status = response.status, "token endpoint responded");

        if !response.is_success() {
            return Err(AuthError::Rejected {
                status: response.status,
                message: rejection_message(&response),
            });
        }

        let grant: TokenGrant =
            serde_json::from_value(response.body).map_err(|e| AuthError::MalformedGrant {
                reason: e.to_string(),
            })?;
        let credential = Credential::from_grant(grant, self.clock.now(), self.expiry_margin)?;

        debug!(
            token = %credential.token_preview(),
            expires_at = %credential.expires_at,
            "credential issued"
        );
        Ok(credential)
    }

    /// Returns `credential` while it is valid, otherwise authenticates again.
    ///
    /// # Errors
    ///
    /// Same as [`TokenManager::authenticate`].
    pub async fn renew_if_expired(
        &self,
        credential: &Credential,
        credentials: &ClientCredentials,
    ) -> Result<Credential, AuthError> {
        if self.is_valid(credential) {
            Ok(credential.clone())
        } else {
            self.authenticate(credentials).await
        }
    }

    /// Returns true while the credential can be used.
    pub fn is_valid(&self, credential: &Credential) -> bool {
        credential.is_valid_at(self.clock.now())
    }

    /// Returns true at and after the credential's expiry.
    pub fn is_expired(&self, credential: &Credential) -> bool {
        credential.is_expired_at(self.clock.now())
    }
}

fn rejection_message(response: &TransportResponse) -> String {
    match &response.body {
        Value::Object(map) => map
            .get("error_description")
            .or_else(|| map.get("message"))
            .or_else(|| map.get("error"))
            .and_then(Value::as_str)
            .map_or_else(|| response.body.to_string(), str::to_string),
        Value::String(text) => text.clone(),
        Value::Null => "empty response body".to_string(),
        other => other.to_string(),
    }
}
