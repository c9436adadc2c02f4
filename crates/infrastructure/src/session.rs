//! Ready-made wiring of transport, token manager, client and harvester.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;
use trapi_application::ports::{Clock, HttpTransport, TransportError};
use trapi_application::{
    ClientCredentials, ClientResult, CredentialSource, Harvester, PageExecutor, PagedEndpoint,
    ResearchClient, RetryPolicy, TokenManager,
};
use trapi_domain::{AuthError, Credential, FieldSet, QuerySpec, Video};

use crate::adapters::{ReqwestTransport, SystemClock};
use crate::config::{ClientConfig, ConfigError};

/// Errors raised while building a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Configuration is incomplete or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP client could not be created.
    #[error("failed to create HTTP transport: {0}")]
    Transport(#[from] TransportError),
}

/// A configured client that keeps one credential and renews it when it
/// expires.
///
/// Renewal happens lazily in [`ResearchSession::credential`], so a long
/// harvest picks up a new token as soon as the old one expires. Two tasks
/// racing past an expired credential may both authenticate; either result
/// is valid and the later one is kept.
pub struct ResearchSession<T = ReqwestTransport, C = SystemClock> {
    tokens: TokenManager<Arc<T>, C>,
    credentials: ClientCredentials,
    client: ResearchClient<Arc<T>>,
    harvester: Harvester<Arc<T>>,
    retry: RetryPolicy,
    current: RwLock<Option<Credential>>,
}

impl ResearchSession {
    /// Builds a session backed by reqwest and the system clock.
    ///
    /// # Errors
    ///
    /// Fails when credentials are missing or the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, SessionError> {
        let transport = ReqwestTransport::with_settings(&config.user_agent, config.timeout())?;
        Self::with_transport(config, Arc::new(transport), SystemClock::new())
    }
}

impl<T: HttpTransport, C: Clock> ResearchSession<T, C> {
    /// Builds a session over any transport and clock.
    ///
    /// # Errors
    ///
    /// Fails when credentials are missing.
    pub fn with_transport(
        config: &ClientConfig,
        transport: Arc<T>,
        clock: C,
    ) -> Result<Self, SessionError> {
        let credentials = config.client_credentials()?;
        let tokens = TokenManager::new(Arc::clone(&transport), clock)
            .with_token_url(config.token_url.clone())
            .with_expiry_margin(config.expiry_margin());
        let client = ResearchClient::with_base_url(Arc::clone(&transport), config.base_url.clone());
        let harvester = Harvester::new(
            PageExecutor::with_base_url(transport, config.base_url.clone()),
            config.retry_policy(),
        );

        Ok(Self {
            tokens,
            credentials,
            client,
            harvester,
            retry: config.retry_policy(),
            current: RwLock::new(None),
        })
    }

    /// Single-request operations.
    #[must_use]
    pub const fn client(&self) -> &ResearchClient<Arc<T>> {
        &self.client
    }

    /// Bulk collection with retry.
    #[must_use]
    pub const fn harvester(&self) -> &Harvester<Arc<T>> {
        &self.harvester
    }

    /// Returns the cached credential, authenticating first when there is
    /// none or it has expired.
    ///
    /// Network failures, 429 and 5xx from the token endpoint are retried
    /// with the configured policy.
    ///
    /// # Errors
    ///
    /// Returns [`trapi_application::ClientError::Auth`] when the exchange
    /// fails.
    pub async fn credential(&self) -> ClientResult<Credential> {
        if let Some(credential) = self.current.read().await.as_ref()
            && self.tokens.is_valid(credential)
        {
            return Ok(credential.clone());
        }

        debug!("no valid credential cached");
        let tokens = &self.tokens;
        let credentials = &self.credentials;
        let fresh = self
            .retry
            .run_if(
                move || tokens.authenticate(credentials),
                AuthError::is_transient,
            )
            .await?;
        *self.current.write().await = Some(fresh.clone());
        Ok(fresh)
    }

    /// Drops the cached credential so the next call authenticates again.
    pub async fn invalidate(&self) {
        self.current.write().await.take();
    }

    /// All videos matching `spec`, one day at a time, renewing the
    /// credential between pages when it expires.
    ///
    /// # Errors
    ///
    /// See [`Harvester::videos`].
    pub async fn videos(&self, spec: &QuerySpec, fields: &FieldSet) -> ClientResult<Vec<Video>> {
        self.harvester.videos(self, spec, fields).await
    }

    /// All records of a cursor-paginated endpoint.
    ///
    /// # Errors
    ///
    /// See [`Harvester::collect`].
    pub async fn collect<E: PagedEndpoint>(
        &self,
        request: &E::Request,
        fields: Option<&FieldSet>,
    ) -> ClientResult<Vec<E::Record>> {
        self.harvester.collect::<E, Self>(self, request, fields).await
    }
}

#[async_trait]
impl<T: HttpTransport, C: Clock> CredentialSource for ResearchSession<T, C> {
    async fn credential(&self) -> ClientResult<Credential> {
        Self::credential(self).await
    }
}
