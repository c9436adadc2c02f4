//! Request bodies for the user, comment and playlist endpoints.

use serde::{Deserialize, Serialize};

use super::error::{ValidationError, Violation, finish};
use crate::page::{Cursor, SearchId};

/// Largest page size the research API accepts.
pub const MAX_COUNT_LIMIT: u32 = 100;

/// A JSON request body that can be checked before it is sent.
pub trait ApiRequest: Serialize + Send + Sync {
    /// Checks the request.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing every violation found.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// A request that can be resumed from a continuation cursor.
pub trait PageRequest: ApiRequest + Clone {
    /// Cursor the request resumes from.
    fn cursor(&self) -> Option<&Cursor>;

    /// The same request advanced to the next page.
    ///
    /// Requests without a search session ignore `search_id`.
    #[must_use]
    fn next_page(&self, cursor: Cursor, search_id: Option<SearchId>) -> Self;
}

pub(crate) fn check_max_count(max_count: Option<u32>) -> Option<Violation> {
    max_count
        .filter(|count| !(1..=MAX_COUNT_LIMIT).contains(count))
        .map(|value| Violation::MaxCountOutOfRange { value })
}

fn check_username(username: &str) -> Option<Violation> {
    username.trim().is_empty().then_some(Violation::MissingUsername)
}

fn check_positive(name: &'static str, value: i64) -> Option<Violation> {
    (value <= 0).then_some(Violation::NonPositiveId { name, value })
}

/// Body of the followers, following, liked, reposted and pinned video
/// endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPageRequest {
    /// Account to inspect.
    pub username: String,
    /// Page size, server default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_count: Option<u32>,
    /// Continuation cursor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Cursor>,
}

impl UserPageRequest {
    /// First page for `username`.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            max_count: None,
            cursor: None,
        }
    }

    /// Sets the page size.
    #[must_use]
    pub const fn with_max_count(mut self, max_count: u32) -> Self {
        self.max_count = Some(max_count);
        self
    }

    /// Resumes from `cursor`.
    #[must_use]
    pub fn with_cursor(mut self, cursor: impl Into<Cursor>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }
}

impl ApiRequest for UserPageRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        finish(
            [
                check_username(&self.username),
                check_max_count(self.max_count),
            ]
            .into_iter()
            .flatten()
            .collect(),
        )
    }
}

impl PageRequest for UserPageRequest {
    fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    fn next_page(&self, cursor: Cursor, _search_id: Option<SearchId>) -> Self {
        Self {
            cursor: Some(cursor),
            ..self.clone()
        }
    }
}

/// Body of the video comment list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentPageRequest {
    /// Video whose comments are listed.
    pub video_id: i64,
    /// Page size, server default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_count: Option<u32>,
    /// Continuation cursor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Cursor>,
}

impl CommentPageRequest {
    /// First page of comments on `video_id`.
    #[must_use]
    pub const fn new(video_id: i64) -> Self {
        Self {
            video_id,
            max_count: None,
            cursor: None,
        }
    }

    /// Sets the page size.
    #[must_use]
    pub const fn with_max_count(mut self, max_count: u32) -> Self {
        self.max_count = Some(max_count);
        self
    }

    /// Resumes from `cursor`.
    #[must_use]
    pub fn with_cursor(mut self, cursor: impl Into<Cursor>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }
}

impl ApiRequest for CommentPageRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        finish(
            [
                check_positive("video_id", self.video_id),
                check_max_count(self.max_count),
            ]
            .into_iter()
            .flatten()
            .collect(),
        )
    }
}

impl PageRequest for CommentPageRequest {
    fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    fn next_page(&self, cursor: Cursor, _search_id: Option<SearchId>) -> Self {
        Self {
            cursor: Some(cursor),
            ..self.clone()
        }
    }
}

/// Body of the user info endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfoRequest {
    /// Account to look up.
    pub username: String,
}

impl UserInfoRequest {
    /// Looks up `username`.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

impl ApiRequest for UserInfoRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        finish(check_username(&self.username).into_iter().collect())
    }
}

/// Body of the playlist info endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistInfoRequest {
    /// Playlist to look up.
    pub playlist_id: i64,
    /// Offset into the playlist's video ids.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Cursor>,
}

impl PlaylistInfoRequest {
    /// Looks up `playlist_id`.
    #[must_use]
    pub const fn new(playlist_id: i64) -> Self {
        Self {
            playlist_id,
            cursor: None,
        }
    }

    /// Starts from `cursor`.
    #[must_use]
    pub fn with_cursor(mut self, cursor: impl Into<Cursor>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }
}

impl ApiRequest for PlaylistInfoRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        finish(
            check_positive("playlist_id", self.playlist_id)
                .into_iter()
                .collect(),
        )
    }
}
