//! Predicate clauses for video search

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::Violation;

/// Comparison applied by a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    /// Equal to.
    Eq,
    /// Member of the value list.
    In,
    /// Greater than.
    Gt,
    /// Greater than or equal to.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal to.
    Lte,
}

/// Video attribute a condition filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionField {
    /// Video identifier.
    Id,
    /// Video description.
    VideoDescription,
    /// Creation day, `YYYYMMDD`.
    CreateTime,
    /// Author region.
    RegionCode,
    /// Share count.
    ShareCount,
    /// View count.
    ViewCount,
    /// Like count.
    LikeCount,
    /// Comment count.
    CommentCount,
    /// Music identifier.
    MusicId,
    /// Hashtag names.
    HashtagNames,
    /// Author username.
    Username,
    /// Effect identifiers.
    EffectIds,
    /// Playlist identifier.
    PlaylistId,
    /// Voice-to-text transcription.
    VoiceToText,
    /// STEM verification flag.
    IsStemVerified,
    /// Favorites count.
    FavoritesCount,
    /// Length bucket, see [`VideoLength`].
    VideoDuration,
}

impl ConditionField {
    /// Wire name of the field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::VideoDescription => "video_description",
            Self::CreateTime => "create_time",
            Self::RegionCode => "region_code",
            Self::ShareCount => "share_count",
            Self::ViewCount => "view_count",
            Self::LikeCount => "like_count",
            Self::CommentCount => "comment_count",
            Self::MusicId => "music_id",
            Self::HashtagNames => "hashtag_names",
            Self::Username => "username",
            Self::EffectIds => "effect_ids",
            Self::PlaylistId => "playlist_id",
            Self::VoiceToText => "voice_to_text",
            Self::IsStemVerified => "is_stem_verified",
            Self::FavoritesCount => "favorites_count",
            Self::VideoDuration => "video_duration",
        }
    }
}

impl fmt::Display for ConditionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Length bucket accepted by `video_duration` conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VideoLength {
    /// Under 15 seconds.
    Short,
    /// 15 to 60 seconds.
    Mid,
    /// 1 to 5 minutes.
    Long,
    /// Over 5 minutes.
    ExtraLong,
}

impl VideoLength {
    /// Wire name of the bucket.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Short => "SHORT",
            Self::Mid => "MID",
            Self::Long => "LONG",
            Self::ExtraLong => "EXTRA_LONG",
        }
    }
}

impl FromStr for VideoLength {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SHORT" => Ok(Self::Short),
            "MID" => Ok(Self::Mid),
            "LONG" => Ok(Self::Long),
            "EXTRA_LONG" => Ok(Self::ExtraLong),
            _ => Err(()),
        }
    }
}

/// A single value in a condition's value list.
///
/// The API accepts both strings and integers and echoes back whichever form
/// was sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Integer value.
    Int(i64),
    /// String value.
    Str(String),
}

impl FieldValue {
    fn as_positive_int(&self) -> Option<i64> {
        let value = match self {
            Self::Int(value) => Some(*value),
            Self::Str(value) => value.trim().parse().ok(),
        };
        value.filter(|value| *value > 0)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Str(value) => f.write_str(value),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<VideoLength> for FieldValue {
    fn from(value: VideoLength) -> Self {
        Self::Str(value.as_str().to_string())
    }
}

/// One `(operation, field, values)` clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Comparison to apply.
    pub operation: Operation,
    /// Field the comparison targets.
    pub field_name: ConditionField,
    /// Values compared against.
    pub field_values: Vec<FieldValue>,
}

impl Condition {
    /// Creates a condition. Values are checked when the query is built.
    #[must_use]
    pub fn new<I, V>(operation: Operation, field_name: ConditionField, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        Self {
            operation,
            field_name,
            field_values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Shorthand for an `EQ` condition on a single value.
    #[must_use]
    pub fn equals(field_name: ConditionField, value: impl Into<FieldValue>) -> Self {
        Self::new(Operation::Eq, field_name, [value.into()])
    }

    /// Shorthand for an `IN` condition.
    #[must_use]
    pub fn is_in<I, V>(field_name: ConditionField, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        Self::new(Operation::In, field_name, values)
    }

    /// Checks the value list against the rules for `field_name`.
    pub(crate) fn violations(&self) -> Vec<Violation> {
        if self.field_values.is_empty() {
            return vec![Violation::EmptyValues {
                field: self.field_name,
            }];
        }

        self.field_values
            .iter()
            .filter_map(|value| {
                check_value(self.field_name, value).map(|reason| Violation::InvalidValue {
                    field: self.field_name,
                    value: value.to_string(),
                    reason,
                })
            })
            .collect()
    }
}

fn check_value(field: ConditionField, value: &FieldValue) -> Option<&'static str> {
    match field {
        ConditionField::CreateTime => match value {
            FieldValue::Str(s) if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) => None,
            _ => Some("expected a YYYYMMDD string"),
        },
        ConditionField::Username => match value {
            FieldValue::Str(s) if !s.trim().is_empty() => None,
            _ => Some("expected a non-empty username"),
        },
        ConditionField::RegionCode => match value {
            FieldValue::Str(s) if s.len() == 2 && s.bytes().all(|b| b.is_ascii_uppercase()) => {
                None
            }
            _ => Some("expected a two letter uppercase region code"),
        },
        ConditionField::VideoDuration => match value {
            FieldValue::Str(s) if s.parse::<VideoLength>().is_ok() => None,
            _ => Some("expected one of SHORT, MID, LONG, EXTRA_LONG"),
        },
        ConditionField::Id
        | ConditionField::MusicId
        | ConditionField::EffectIds
        | ConditionField::PlaylistId => {
            if value.as_positive_int().is_some() {
                None
            } else {
                Some("expected a positive integer")
            }
        }
        _ => None,
    }
}

/// Boolean combination of conditions sent as the `query` member.
///
/// Groups that are empty are omitted from the wire form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicate {
    /// Every clause must hold.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub and: Vec<Condition>,
    /// At least one clause must hold.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub or: Vec<Condition>,
    /// No clause may hold.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub not: Vec<Condition>,
}

impl Predicate {
    /// Returns true when no group carries a clause.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.and.is_empty() && self.or.is_empty() && self.not.is_empty()
    }

    /// Iterates over every clause, `and` first, then `or`, then `not`.
    pub fn conditions(&self) -> impl Iterator<Item = &Condition> {
        self.and.iter().chain(&self.or).chain(&self.not)
    }
}
