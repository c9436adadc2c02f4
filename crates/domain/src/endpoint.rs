//! Endpoint catalog and field-projection registry.

use std::fmt;

use thiserror::Error;

use crate::page::Continuation;

const VIDEO_FIELDS: &[&str] = &[
    "id",
    "video_description",
    "create_time",
    "region_code",
    "share_count",
    "view_count",
    "like_count",
    "comment_count",
    "music_id",
    "hashtag_names",
    "username",
    "effect_ids",
    "playlist_id",
    "voice_to_text",
    "is_stem_verified",
    "favorites_count",
    "video_duration",
];

const USER_VIDEO_FIELDS: &[&str] = &[
    "id",
    "create_time",
    "username",
    "region_code",
    "video_description",
    "music_id",
    "like_count",
    "comment_count",
    "share_count",
    "view_count",
    "hashtag_names",
    "video_duration",
    "is_stem_verified",
    "favorites_count",
];

const USER_INFO_FIELDS: &[&str] = &[
    "display_name",
    "bio_description",
    "avatar_url",
    "is_verified",
    "follower_count",
    "following_count",
    "likes_count",
    "video_count",
];

const COMMENT_FIELDS: &[&str] = &[
    "id",
    "video_id",
    "text",
    "like_count",
    "reply_count",
    "parent_comment_id",
    "create_time",
];

/// A research API endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `research/user/info`
    UserInfo,
    /// `research/video/query`
    VideoQuery,
    /// `research/video/comment/list`
    VideoComments,
    /// `research/user/followers`
    UserFollowers,
    /// `research/user/following`
    UserFollowing,
    /// `research/user/liked_videos`
    UserLikedVideos,
    /// `research/user/pinned_videos`
    UserPinnedVideos,
    /// `research/user/reposted_videos`
    UserRepostedVideos,
    /// `research/playlist/info`
    PlaylistInfo,
}

impl Endpoint {
    /// Path relative to the API base URL, including the version prefix.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::UserInfo => "/v2/research/user/info/",
            Self::VideoQuery => "/v2/research/video/query/",
            Self::VideoComments => "/v2/research/video/comment/list/",
            Self::UserFollowers => "/v2/research/user/followers/",
            Self::UserFollowing => "/v2/research/user/following/",
            Self::UserLikedVideos => "/v2/research/user/liked_videos/",
            Self::UserPinnedVideos => "/v2/research/user/pinned_videos/",
            Self::UserRepostedVideos => "/v2/research/user/reposted_videos/",
            Self::PlaylistInfo => "/v2/research/playlist/info/",
        }
    }

    /// Field names the endpoint accepts in its `fields` projection.
    ///
    /// Empty for endpoints that take no projection.
    #[must_use]
    pub const fn fields(self) -> &'static [&'static str] {
        match self {
            Self::UserInfo => USER_INFO_FIELDS,
            Self::VideoQuery => VIDEO_FIELDS,
            Self::VideoComments => COMMENT_FIELDS,
            Self::UserLikedVideos | Self::UserPinnedVideos | Self::UserRepostedVideos => {
                USER_VIDEO_FIELDS
            }
            Self::UserFollowers | Self::UserFollowing | Self::PlaylistInfo => &[],
        }
    }

    /// Whether requests must carry a `fields` projection.
    #[must_use]
    pub const fn accepts_projection(self) -> bool {
        !self.fields().is_empty()
    }

    /// Member of `data` holding the record list, `None` for single-object
    /// responses.
    #[must_use]
    pub const fn list_key(self) -> Option<&'static str> {
        match self {
            Self::VideoQuery => Some("videos"),
            Self::VideoComments => Some("comments"),
            Self::UserFollowers => Some("user_followers"),
            Self::UserFollowing => Some("user_following"),
            Self::UserLikedVideos => Some("user_liked_videos"),
            Self::UserPinnedVideos => Some("pinned_videos_list"),
            Self::UserRepostedVideos => Some("reposted_videos"),
            Self::UserInfo | Self::PlaylistInfo => None,
        }
    }

    /// Continuation tokens required when the endpoint reports `has_more`.
    #[must_use]
    pub const fn continuation(self) -> Continuation {
        match self {
            Self::VideoQuery => Continuation::CursorAndSearchId,
            Self::VideoComments
            | Self::UserFollowers
            | Self::UserFollowing
            | Self::UserLikedVideos
            | Self::UserRepostedVideos => Continuation::Cursor,
            Self::UserInfo | Self::UserPinnedVideos | Self::PlaylistInfo => Continuation::None,
        }
    }

    /// Returns true if `name` is a legal projection field.
    #[must_use]
    pub fn is_known_field(self, name: &str) -> bool {
        self.fields().iter().any(|known| *known == name)
    }

    /// Short name used in logs and errors.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::UserInfo => "user/info",
            Self::VideoQuery => "video/query",
            Self::VideoComments => "video/comment/list",
            Self::UserFollowers => "user/followers",
            Self::UserFollowing => "user/following",
            Self::UserLikedVideos => "user/liked_videos",
            Self::UserPinnedVideos => "user/pinned_videos",
            Self::UserRepostedVideos => "user/reposted_videos",
            Self::PlaylistInfo => "playlist/info",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Invalid field projection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// No fields were requested.
    #[error("no fields requested for {endpoint}")]
    Empty {
        /// Target endpoint.
        endpoint: Endpoint,
    },

    /// Some names are not legal for the endpoint.
    #[error("unknown fields for {endpoint}: {}", .names.join(", "))]
    Unknown {
        /// Target endpoint.
        endpoint: Endpoint,
        /// The unrecognized names, in request order.
        names: Vec<String>,
    },

    /// The endpoint takes no projection.
    #[error("{endpoint} does not accept a field projection")]
    NotSupported {
        /// Target endpoint.
        endpoint: Endpoint,
    },

    /// The projection was built for another endpoint.
    #[error("field set built for {built_for} used with {endpoint}")]
    WrongEndpoint {
        /// Endpoint the set was validated against.
        built_for: Endpoint,
        /// Endpoint it was used with.
        endpoint: Endpoint,
    },
}

/// A validated, non-empty field projection for one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSet {
    endpoint: Endpoint,
    names: Vec<&'static str>,
}

impl FieldSet {
    /// Validates `names` against the endpoint's registry.
    ///
    /// Duplicates are dropped, first occurrence wins.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError`] when the endpoint takes no projection, when
    /// `names` is empty, or when any name is unknown. All unknown names are
    /// reported together.
    pub fn new<I, S>(endpoint: Endpoint, names: I) -> Result<Self, FieldError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if !endpoint.accepts_projection() {
            return Err(FieldError::NotSupported { endpoint });
        }

        let mut accepted: Vec<&'static str> = Vec::new();
        let mut unknown = Vec::new();
        for name in names {
            let name = name.as_ref();
            match endpoint.fields().iter().find(|known| **known == name) {
                Some(&known) => {
                    if !accepted.contains(&known) {
                        accepted.push(known);
                    }
                }
                None => unknown.push(name.to_string()),
            }
        }

        if !unknown.is_empty() {
            return Err(FieldError::Unknown {
                endpoint,
                names: unknown,
            });
        }
        if accepted.is_empty() {
            return Err(FieldError::Empty { endpoint });
        }

        Ok(Self {
            endpoint,
            names: accepted,
        })
    }

    /// Every field the endpoint supports.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::NotSupported`] for endpoints without projection.
    pub fn all(endpoint: Endpoint) -> Result<Self, FieldError> {
        Self::new(endpoint, endpoint.fields().iter().copied())
    }

    /// Endpoint the set was validated for.
    #[must_use]
    pub const fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// Field names in request order.
    #[must_use]
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    /// Checks that the set belongs to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::WrongEndpoint`] on mismatch.
    pub fn ensure_for(&self, endpoint: Endpoint) -> Result<(), FieldError> {
        if self.endpoint == endpoint {
            Ok(())
        } else {
            Err(FieldError::WrongEndpoint {
                built_for: self.endpoint,
                endpoint,
            })
        }
    }

    /// Value of the `fields` query parameter.
    #[must_use]
    pub fn to_query_value(&self) -> String {
        self.names.join(",")
    }
}
