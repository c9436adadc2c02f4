//! Typed research API operations.

use trapi_domain::{
    Comment, CommentPageRequest, Credential, FieldSet, FollowUser, Playlist, PlaylistInfoRequest,
    QuerySpec, ResponsePage, UserInfo, UserInfoRequest, UserPageRequest, Video,
};

use crate::error::ClientResult;
use crate::executor::{
    PageExecutor, PlaylistLookup, UserFollowers, UserFollowing, UserInfoLookup, UserLikedVideos,
    UserPinnedVideos, UserRepostedVideos, VideoComments, VideoSearch,
};
use crate::ports::HttpTransport;

/// One method per research endpoint, each issuing a single request.
///
/// All methods share the error classification documented on
/// [`PageExecutor::fetch_page`].
#[derive(Debug, Clone)]
pub struct ResearchClient<T> {
    executor: PageExecutor<T>,
}

impl<T: HttpTransport> ResearchClient<T> {
    /// Creates a client against the public API.
    pub fn new(transport: T) -> Self {
        Self {
            executor: PageExecutor::new(transport),
        }
    }

    /// Creates a client against another deployment.
    pub fn with_base_url(transport: T, base_url: impl Into<String>) -> Self {
        Self {
            executor: PageExecutor::with_base_url(transport, base_url),
        }
    }

    /// The underlying page executor.
    #[must_use]
    pub const fn executor(&self) -> &PageExecutor<T> {
        &self.executor
    }

    /// Public profile of `username`.
    ///
    /// # Errors
    ///
    /// Fails like any other request; see [`PageExecutor::fetch_object`].
    pub async fn user_info(
        &self,
        credential: &Credential,
        username: &str,
        fields: &FieldSet,
    ) -> ClientResult<UserInfo> {
        self.executor
            .fetch_object::<UserInfoLookup>(credential, &UserInfoRequest::new(username), Some(fields))
            .await
    }

    /// One page of video search results.
    ///
    /// # Errors
    ///
    /// See [`PageExecutor::fetch_page`].
    pub async fn search_videos(
        &self,
        credential: &Credential,
        spec: &QuerySpec,
        fields: &FieldSet,
    ) -> ClientResult<ResponsePage<Video>> {
        self.executor
            .fetch_page::<VideoSearch>(credential, spec, Some(fields))
            .await
    }

    /// One page of comments on a video.
    ///
    /// # Errors
    ///
    /// See [`PageExecutor::fetch_page`].
    pub async fn video_comments(
        &self,
        credential: &Credential,
        request: &CommentPageRequest,
        fields: &FieldSet,
    ) -> ClientResult<ResponsePage<Comment>> {
        self.executor
            .fetch_page::<VideoComments>(credential, request, Some(fields))
            .await
    }

    /// One page of a user's followers.
    ///
    /// # Errors
    ///
    /// See [`PageExecutor::fetch_page`].
    pub async fn user_followers(
        &self,
        credential: &Credential,
        request: &UserPageRequest,
    ) -> ClientResult<ResponsePage<FollowUser>> {
        self.executor
            .fetch_page::<UserFollowers>(credential, request, None)
            .await
    }

    /// One page of the accounts a user follows.
    ///
    /// # Errors
    ///
    /// See [`PageExecutor::fetch_page`].
    pub async fn user_following(
        &self,
        credential: &Credential,
        request: &UserPageRequest,
    ) -> ClientResult<ResponsePage<FollowUser>> {
        self.executor
            .fetch_page::<UserFollowing>(credential, request, None)
            .await
    }

    /// One page of videos a user liked.
    ///
    /// # Errors
    ///
    /// See [`PageExecutor::fetch_page`].
    pub async fn user_liked_videos(
        &self,
        credential: &Credential,
        request: &UserPageRequest,
        fields: &FieldSet,
    ) -> ClientResult<ResponsePage<Video>> {
        self.executor
            .fetch_page::<UserLikedVideos>(credential, request, Some(fields))
            .await
    }

    /// One page of videos a user reposted.
    ///
    /// # Errors
    ///
    /// See [`PageExecutor::fetch_page`].
    pub async fn user_reposted_videos(
        &self,
        credential: &Credential,
        request: &UserPageRequest,
        fields: &FieldSet,
    ) -> ClientResult<ResponsePage<Video>> {
        self.executor
            .fetch_page::<UserRepostedVideos>(credential, request, Some(fields))
            .await
    }

    /// Videos pinned to a profile. The endpoint is not paginated.
    ///
    /// # Errors
    ///
    /// See [`PageExecutor::fetch_page`].
    pub async fn user_pinned_videos(
        &self,
        credential: &Credential,
        username: &str,
        fields: &FieldSet,
    ) -> ClientResult<Vec<Video>> {
        let page = self
            .executor
            .fetch_page::<UserPinnedVideos>(credential, &UserPageRequest::new(username), Some(fields))
            .await?;
        Ok(page.into_records())
    }

    /// Playlist metadata.
    ///
    /// # Errors
    ///
    /// See [`PageExecutor::fetch_object`].
    pub async fn playlist_info(
        &self,
        credential: &Credential,
        request: &PlaylistInfoRequest,
    ) -> ClientResult<Playlist> {
        self.executor
            .fetch_object::<PlaylistLookup>(credential, request, None)
            .await
    }
}
