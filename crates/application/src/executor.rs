//! Single page execution.
//!
//! One call issues exactly one HTTP request and decodes one page. Looping
//! over pages and days is the caller's job (see [`crate::harvest`]).
//!
//! A page moves through `Init -> Requesting -> (HasMore | Done | Failed)`:
//! the projection and request are checked in `Init` before anything is
//! sent, and the continuation contract is enforced while decoding.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};
use trapi_domain::{
    ApiErrorBody, ApiRequest, Comment, CommentPageRequest, Credential, Endpoint, FieldError,
    FieldSet, FollowUser, PageRequest, PageState, Playlist, PlaylistInfoRequest, ProtocolError,
    QuerySpec, ResponsePage, UserInfo, UserInfoRequest, UserPageRequest, Video,
};

use crate::error::{ClientError, ClientResult, RequestError};
use crate::ports::{HttpTransport, TransportRequest, TransportResponse};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://open.tiktokapis.com";

/// An endpoint that returns a list of records, possibly over many pages.
pub trait PagedEndpoint {
    /// Request body type.
    type Request: PageRequest;
    /// Record type found in the list.
    type Record: DeserializeOwned + Send;
    /// Catalog entry.
    const ENDPOINT: Endpoint;
}

/// An endpoint that returns a single object in `data`.
pub trait ObjectEndpoint {
    /// Request body type.
    type Request: ApiRequest;
    /// Decoded `data` type.
    type Record: DeserializeOwned + Send;
    /// Catalog entry.
    const ENDPOINT: Endpoint;
}

macro_rules! paged_endpoint {
    ($(#[$doc:meta])* $name:ident, $request:ty, $record:ty, $endpoint:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl PagedEndpoint for $name {
            type Request = $request;
            type Record = $record;
            const ENDPOINT: Endpoint = $endpoint;
        }
    };
}

paged_endpoint!(
    /// Video search.
    VideoSearch, QuerySpec, Video, Endpoint::VideoQuery
);
paged_endpoint!(
    /// Comments on a video.
    VideoComments, CommentPageRequest, Comment, Endpoint::VideoComments
);
paged_endpoint!(
    /// Accounts following a user.
    UserFollowers, UserPageRequest, FollowUser, Endpoint::UserFollowers
);
paged_endpoint!(
    /// Accounts a user follows.
    UserFollowing, UserPageRequest, FollowUser, Endpoint::UserFollowing
);
paged_endpoint!(
    /// Videos a user liked.
    UserLikedVideos, UserPageRequest, Video, Endpoint::UserLikedVideos
);
paged_endpoint!(
    /// Videos a user reposted.
    UserRepostedVideos, UserPageRequest, Video, Endpoint::UserRepostedVideos
);
paged_endpoint!(
    /// Videos pinned to a profile. Single page.
    UserPinnedVideos, UserPageRequest, Video, Endpoint::UserPinnedVideos
);

/// Public profile lookup.
#[derive(Debug, Clone, Copy)]
pub struct UserInfoLookup;

impl ObjectEndpoint for UserInfoLookup {
    type Request = UserInfoRequest;
    type Record = UserInfo;
    const ENDPOINT: Endpoint = Endpoint::UserInfo;
}

/// Playlist lookup.
#[derive(Debug, Clone, Copy)]
pub struct PlaylistLookup;

impl ObjectEndpoint for PlaylistLookup {
    type Request = PlaylistInfoRequest;
    type Record = Playlist;
    const ENDPOINT: Endpoint = Endpoint::PlaylistInfo;
}

/// Issues one page request per call.
#[derive(Debug, Clone)]
pub struct PageExecutor<T> {
    transport: T,
    base_url: String,
}

impl<T: HttpTransport> PageExecutor<T> {
    /// Creates an executor against [`DEFAULT_BASE_URL`].
    pub fn new(transport: T) -> Self {
        Self::with_base_url(transport, DEFAULT_BASE_URL)
    }

    /// Creates an executor against another deployment.
    pub fn with_base_url(transport: T, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            transport,
            base_url,
        }
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches one page of video search results.
    ///
    /// # Errors
    ///
    /// See [`PageExecutor::fetch_page`].
    pub async fn search(
        &self,
        credential: &Credential,
        spec: &QuerySpec,
        fields: &FieldSet,
    ) -> ClientResult<ResponsePage<Video>> {
        self.fetch_page::<VideoSearch>(credential, spec, Some(fields))
            .await
    }

    /// Fetches one page from a list endpoint.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Field`] when the projection is missing, empty,
    ///   unknown or built for another endpoint.
    /// - [`ClientError::Validation`] when the request is malformed.
    /// - [`ClientError::Auth`] on 401.
    /// - [`ClientError::Transient`] on network errors, 429 and 5xx.
    /// - [`ClientError::Request`] on other 4xx or an error code in a 2xx body.
    /// - [`ClientError::Protocol`] when `has_more` comes without the
    ///   continuation tokens the endpoint requires.
    #[instrument(skip_all, fields(endpoint = %E::ENDPOINT))]
    pub async fn fetch_page<E: PagedEndpoint>(
        &self,
        credential: &Credential,
        request: &E::Request,
        fields: Option<&FieldSet>,
    ) -> ClientResult<ResponsePage<E::Record>> {
        debug!(state = %PageState::Init, cursor = ?request.cursor(), "preparing page");
        let outgoing = self.prepare(E::ENDPOINT, credential, request, fields)?;
        let list_key = E::ENDPOINT
            .list_key()
            .ok_or_else(|| RequestError::InvalidTarget {
                message: format!("{} has no record list", E::ENDPOINT),
            })?;

        let data = self.exchange(outgoing).await?;
        let page = ResponsePage::from_data(&data, list_key, E::ENDPOINT.continuation())
            .inspect_err(|e| debug!(state = %PageState::Failed, error = %e, "page rejected"))?;

        debug!(
            state = %page.state(),
            records = page.len(),
            cursor = ?page.cursor(),
            "page decoded"
        );
        Ok(page)
    }

    /// Fetches a single-object endpoint.
    ///
    /// # Errors
    ///
    /// Same classification as [`PageExecutor::fetch_page`]; a `data` member
    /// that does not decode is a [`ClientError::Protocol`].
    #[instrument(skip_all, fields(endpoint = %E::ENDPOINT))]
    pub async fn fetch_object<E: ObjectEndpoint>(
        &self,
        credential: &Credential,
        request: &E::Request,
        fields: Option<&FieldSet>,
    ) -> ClientResult<E::Record> {
        let outgoing = self.prepare(E::ENDPOINT, credential, request, fields)?;
        let data = self.exchange(outgoing).await?;
        let record = serde_json::from_value(data)
            .map_err(|e| ProtocolError::malformed(format!("data: {e}")))?;
        debug!(state = %PageState::Done, "object decoded");
        Ok(record)
    }

    fn prepare<R: ApiRequest>(
        &self,
        endpoint: Endpoint,
        credential: &Credential,
        request: &R,
        fields: Option<&FieldSet>,
    ) -> ClientResult<TransportRequest> {
        let projection = match (endpoint.accepts_projection(), fields) {
            (true, Some(fields)) => {
                fields.ensure_for(endpoint)?;
                Some(fields.to_query_value())
            }
            (true, None) => return Err(FieldError::Empty { endpoint }.into()),
            (false, Some(_)) => return Err(FieldError::NotSupported { endpoint }.into()),
            (false, None) => None,
        };
        request.validate()?;

        let body = serde_json::to_value(request).map_err(|e| RequestError::Encode {
            message: e.to_string(),
        })?;

        let mut outgoing = TransportRequest::post(format!("{}{}", self.base_url, endpoint.path()))
            .with_header("Authorization", credential.authorization_header())
            .with_header("Content-Type", "application/json")
            .with_json(body);
        if let Some(projection) = projection {
            outgoing = outgoing.with_query("fields", projection);
        }
        Ok(outgoing)
    }

    async fn exchange(&self, request: TransportRequest) -> ClientResult<Value> {
        debug!(
            state = %PageState::Requesting,
            method = %request.method,
            url = %request.url,
            "sending request"
        );
        let response = self.transport.send(request).await.map_err(|e| {
            debug!(state = %PageState::Failed, error = %e, "transport failed");
            ClientError::from(e)
        })?;
        debug!(status = response.status, "response received");
        open_envelope(response)
    }
}

/// Splits an envelope into its `data` member, classifying failures.
fn open_envelope(response: TransportResponse) -> ClientResult<Value> {
    let TransportResponse { status, body } = response;
    let error = error_body(&body);

    if !(200..300).contains(&status) {
        let error = error.unwrap_or_else(|| ApiErrorBody::from_message(render(&body)));
        debug!(state = %PageState::Failed, status, error = %error, "request failed");
        return Err(ClientError::from_status(status, error));
    }
    if let Some(error) = error.filter(ApiErrorBody::is_failure) {
        debug!(state = %PageState::Failed, error = %error, "API reported an error");
        return Err(RequestError::Api { error }.into());
    }

    match body {
        Value::Object(mut envelope) => match envelope.remove("data") {
            Some(data) if !data.is_null() => Ok(data),
            _ => Err(ProtocolError::MissingData.into()),
        },
        _ => Err(ProtocolError::MissingData.into()),
    }
}

fn error_body(body: &Value) -> Option<ApiErrorBody> {
    body.get("error")
        .filter(|error| error.is_object())
        .and_then(|error| serde_json::from_value(error.clone()).ok())
}

fn render(body: &Value) -> String {
    match body {
        Value::String(text) => text.clone(),
        Value::Null => "empty response body".to_string(),
        other => other.to_string(),
    }
}
