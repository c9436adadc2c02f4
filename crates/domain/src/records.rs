//! Records returned by the research endpoints.
//!
//! Every attribute is optional: the `fields` projection decides which ones
//! the server populates, and unrequested attributes are simply absent.

use serde::{Deserialize, Serialize};

/// A video returned by video search or the user video endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    /// Unique video identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// UTC Unix epoch seconds when the video was posted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<i64>,
    /// Author's username.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Two letter country code of the author's registration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_code: Option<String>,
    /// Video description, also known as the title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_description: Option<String>,
    /// Music used in the video.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music_id: Option<i64>,
    /// Number of likes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub like_count: Option<i64>,
    /// Number of comments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_count: Option<i64>,
    /// Number of shares.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_count: Option<i64>,
    /// Number of views.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_count: Option<i64>,
    /// Effects applied to the video.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect_ids: Option<Vec<String>>,
    /// Hashtags the video participates in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hashtag_names: Option<Vec<String>>,
    /// Playlist the video belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist_id: Option<i64>,
    /// Voice-to-text transcription, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_to_text: Option<String>,
    /// Whether the video is verified STEM content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_stem_verified: Option<bool>,
    /// Duration in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_duration: Option<i64>,
    /// Number of favorites.
    #[serde(
        default,
        alias = "favourites_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub favorites_count: Option<i64>,
}

/// A comment on a video.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Comment text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Video the comment belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<i64>,
    /// Parent comment, for replies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_comment_id: Option<i64>,
    /// Number of likes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub like_count: Option<i64>,
    /// Number of replies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_count: Option<i64>,
    /// UTC Unix epoch seconds when the comment was posted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<i64>,
}

/// Public profile information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Bio description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio_description: Option<String>,
    /// Profile picture URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Verified status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
    /// Followers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follower_count: Option<i64>,
    /// Accounts followed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub following_count: Option<i64>,
    /// Total likes received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes_count: Option<i64>,
    /// Videos posted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_count: Option<i64>,
}

/// An entry in a followers or following list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUser {
    /// Profile name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Username.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Playlist metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    /// Playlist identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist_id: Option<i64>,
    /// Playlist name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist_name: Option<String>,
    /// Total items in the playlist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist_item_total: Option<i64>,
    /// When the playlist was last updated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist_last_updated: Option<i64>,
    /// Video ids in the playlist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist_video_ids: Option<Vec<i64>>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_projected_video_leaves_other_fields_absent() {
        let video: Video =
            serde_json::from_value(json!({ "id": 7, "voice_to_text": "hello" })).unwrap();
        assert_eq!(video.id, Some(7));
        assert_eq!(video.voice_to_text.as_deref(), Some("hello"));
        assert_eq!(video.username, None);

        let back = serde_json::to_value(&video).unwrap();
        assert_eq!(back, json!({ "id": 7, "voice_to_text": "hello" }));
    }

    #[test]
    fn test_favourites_alias() {
        let video: Video = serde_json::from_value(json!({ "favourites_count": 3 })).unwrap();
        assert_eq!(video.favorites_count, Some(3));
    }
}
