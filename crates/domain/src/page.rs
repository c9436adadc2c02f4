//! Response pages and the cursor continuation protocol.
//!
//! A page request moves through `Init -> Requesting -> (HasMore | Done | Failed)`.
//! Decoding enforces the continuation contract: when the server says there
//! is more, it must also say where to resume.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Opaque continuation token, passed back verbatim.
///
/// The research API emits integer cursors; other deployments emit strings.
/// Whichever JSON form was received is preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cursor {
    /// Numeric cursor (offset or timestamp).
    Offset(i64),
    /// String cursor.
    Token(String),
}

impl From<i64> for Cursor {
    fn from(value: i64) -> Self {
        Self::Offset(value)
    }
}

impl From<&str> for Cursor {
    fn from(value: &str) -> Self {
        Self::Token(value.to_string())
    }
}

impl From<String> for Cursor {
    fn from(value: String) -> Self {
        Self::Token(value)
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Offset(offset) => write!(f, "{offset}"),
            Self::Token(token) => f.write_str(token),
        }
    }
}

/// Server-assigned identifier correlating all pages of one search.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchId(String);

impl SearchId {
    /// Wraps a raw search identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SearchId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for SearchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which continuation tokens an endpoint must return alongside `has_more`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// Single response, no pagination.
    None,
    /// Pages are chained through `cursor` only.
    Cursor,
    /// Pages are chained through `cursor` and a `search_id` session.
    CursorAndSearchId,
}

/// Page execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    /// Validating the projection and request.
    Init,
    /// Request in flight.
    Requesting,
    /// Page decoded and the server reported more results.
    HasMore,
    /// Page decoded and the query is exhausted.
    Done,
    /// The page request failed.
    Failed,
}

impl PageState {
    /// Returns true for the terminal states.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Requesting => "requesting",
            Self::HasMore => "has_more",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// The server response violated the documented pagination contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// `has_more` was true but a continuation token was absent.
    #[error("has_more is true but `{token}` is missing")]
    MissingContinuation {
        /// Name of the absent token.
        token: &'static str,
    },

    /// `has_more` was true but the cursor did not move past the one sent.
    #[error("cursor `{cursor}` did not advance")]
    StalledCursor {
        /// The repeated cursor.
        cursor: Cursor,
    },

    /// A paginated response did not say whether more results exist.
    #[error("paginated response is missing `has_more`")]
    MissingHasMore,

    /// The response envelope had no `data` object.
    #[error("response envelope is missing `data`")]
    MissingData,

    /// A member of the envelope could not be decoded.
    #[error("malformed response: {message}")]
    Malformed {
        /// Decoder message.
        message: String,
    },
}

impl ProtocolError {
    /// Creates a malformed-response error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

/// One decoded page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsePage<T> {
    records: Vec<T>,
    has_more: bool,
    cursor: Option<Cursor>,
    search_id: Option<SearchId>,
}

impl<T> ResponsePage<T> {
    /// Builds a page, checking the continuation contract.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MissingContinuation`] when `has_more` is true
    /// but a token required by `continuation` is absent.
    pub fn new(
        records: Vec<T>,
        has_more: bool,
        cursor: Option<Cursor>,
        search_id: Option<SearchId>,
        continuation: Continuation,
    ) -> Result<Self, ProtocolError> {
        if has_more {
            match continuation {
                Continuation::None => {}
                Continuation::Cursor => {
                    if cursor.is_none() {
                        return Err(ProtocolError::MissingContinuation { token: "cursor" });
                    }
                }
                Continuation::CursorAndSearchId => {
                    if cursor.is_none() {
                        return Err(ProtocolError::MissingContinuation { token: "cursor" });
                    }
                    if search_id.is_none() {
                        return Err(ProtocolError::MissingContinuation { token: "search_id" });
                    }
                }
            }
        }

        Ok(Self {
            records,
            has_more: has_more && continuation != Continuation::None,
            cursor,
            search_id,
        })
    }

    /// Records in server order.
    #[must_use]
    pub fn records(&self) -> &[T] {
        &self.records
    }

    /// Consumes the page, returning its records.
    #[must_use]
    pub fn into_records(self) -> Vec<T> {
        self.records
    }

    /// Whether the server reported more results.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.has_more
    }

    /// Cursor returned with this page.
    #[must_use]
    pub const fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    /// Search session returned with this page.
    #[must_use]
    pub const fn search_id(&self) -> Option<&SearchId> {
        self.search_id.as_ref()
    }

    /// Terminal state of this page.
    #[must_use]
    pub const fn state(&self) -> PageState {
        if self.has_more {
            PageState::HasMore
        } else {
            PageState::Done
        }
    }

    /// Tokens for the next page, or `None` once the query is done.
    #[must_use]
    pub fn continuation(&self) -> Option<(Cursor, Option<SearchId>)> {
        if !self.has_more {
            return None;
        }
        self.cursor
            .clone()
            .map(|cursor| (cursor, self.search_id.clone()))
    }

    /// Number of records on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the page carries no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<T: DeserializeOwned> ResponsePage<T> {
    /// Decodes the `data` member of a list response.
    ///
    /// A missing or null list is an empty page. `cursor` and `search_id`
    /// that are null are treated as absent.
    ///
    /// # Errors
    ///
    /// Returns a [`ProtocolError`] when `data` is not an object, when a
    /// paginated response omits `has_more`, when records do not decode, or
    /// when the continuation contract is violated.
    pub fn from_data(
        data: &Value,
        list_key: &str,
        continuation: Continuation,
    ) -> Result<Self, ProtocolError> {
        let object = data.as_object().ok_or(ProtocolError::MissingData)?;

        let records = match object.get(list_key) {
            None | Some(Value::Null) => Vec::new(),
            Some(list) => serde_json::from_value(list.clone())
                .map_err(|e| ProtocolError::malformed(format!("data.{list_key}: {e}")))?,
        };

        let has_more = match (object.get("has_more"), continuation) {
            (Some(Value::Bool(flag)), _) => *flag,
            (None | Some(Value::Null), Continuation::None) => false,
            (None | Some(Value::Null), _) => return Err(ProtocolError::MissingHasMore),
            (Some(other), _) => {
                return Err(ProtocolError::malformed(format!(
                    "data.has_more is not a boolean: {other}"
                )));
            }
        };

        let cursor = decode_optional::<Cursor>(object.get("cursor"), "cursor")?;
        let search_id = decode_optional::<SearchId>(object.get("search_id"), "search_id")?;

        Self::new(records, has_more, cursor, search_id, continuation)
    }
}

fn decode_optional<V: DeserializeOwned>(
    value: Option<&Value>,
    name: &str,
) -> Result<Option<V>, ProtocolError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(raw) => serde_json::from_value(raw.clone())
            .map(Some)
            .map_err(|e| ProtocolError::malformed(format!("data.{name}: {e}"))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(Debug, PartialEq, Eq, Deserialize)]
    struct Item {
        id: i64,
    }

    #[test]
    fn test_cursor_keeps_wire_form() {
        let numeric: Cursor = serde_json::from_value(json!(100)).unwrap();
        let token: Cursor = serde_json::from_value(json!("c1")).unwrap();
        assert_eq!(numeric, Cursor::Offset(100));
        assert_eq!(token, Cursor::Token("c1".to_string()));
        assert_eq!(serde_json::to_value(&numeric).unwrap(), json!(100));
        assert_eq!(serde_json::to_value(&token).unwrap(), json!("c1"));
    }

    #[test]
    fn test_done_page() {
        let data = json!({ "videos": [{"id": 1}, {"id": 2}, {"id": 3}], "has_more": false });
        let page: ResponsePage<Item> =
            ResponsePage::from_data(&data, "videos", Continuation::CursorAndSearchId).unwrap();
        assert_eq!(page.len(), 3);
        assert_eq!(page.state(), PageState::Done);
        assert!(page.continuation().is_none());
    }

    #[test]
    fn test_has_more_page_yields_continuation() {
        let data = json!({
            "videos": [{"id": 1}],
            "has_more": true,
            "cursor": "c1",
            "search_id": "s1"
        });
        let page: ResponsePage<Item> =
            ResponsePage::from_data(&data, "videos", Continuation::CursorAndSearchId).unwrap();
        assert_eq!(page.state(), PageState::HasMore);
        assert_eq!(
            page.continuation(),
            Some((Cursor::from("c1"), Some(SearchId::from("s1"))))
        );
    }

    #[test]
    fn test_has_more_without_cursor_is_protocol_error() {
        let data = json!({ "videos": [], "has_more": true, "search_id": "s1" });
        let err = ResponsePage::<Item>::from_data(&data, "videos", Continuation::CursorAndSearchId)
            .unwrap_err();
        assert_eq!(err, ProtocolError::MissingContinuation { token: "cursor" });
    }

    #[test]
    fn test_has_more_without_search_id_is_protocol_error() {
        let data = json!({ "videos": [], "has_more": true, "cursor": 100, "search_id": null });
        let err = ResponsePage::<Item>::from_data(&data, "videos", Continuation::CursorAndSearchId)
            .unwrap_err();
        assert_eq!(err, ProtocolError::MissingContinuation { token: "search_id" });
    }

    #[test]
    fn test_cursor_only_endpoint_ignores_search_id() {
        let data = json!({ "comments": [{"id": 9}], "has_more": true, "cursor": 10 });
        let page: ResponsePage<Item> =
            ResponsePage::from_data(&data, "comments", Continuation::Cursor).unwrap();
        assert_eq!(page.continuation(), Some((Cursor::Offset(10), None)));
    }

    #[test]
    fn test_missing_has_more_on_paginated_endpoint() {
        let data = json!({ "videos": [] });
        let err = ResponsePage::<Item>::from_data(&data, "videos", Continuation::Cursor)
            .unwrap_err();
        assert_eq!(err, ProtocolError::MissingHasMore);
    }

    #[test]
    fn test_unpaginated_endpoint_is_done() {
        let data = json!({ "pinned_videos_list": [{"id": 4}] });
        let page: ResponsePage<Item> =
            ResponsePage::from_data(&data, "pinned_videos_list", Continuation::None).unwrap();
        assert_eq!(page.state(), PageState::Done);
        assert_eq!(page.into_records(), vec![Item { id: 4 }]);
    }

    #[test]
    fn test_data_must_be_object() {
        let err = ResponsePage::<Item>::from_data(&json!([]), "videos", Continuation::Cursor)
            .unwrap_err();
        assert_eq!(err, ProtocolError::MissingData);
    }
}
