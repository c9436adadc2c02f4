//! trapi Domain - Core types for the research API client
//!
//! This crate contains pure domain types with no I/O dependencies:
//! credentials, query specifications, the endpoint catalog, response
//! pages and the records they carry.

pub mod auth;
pub mod endpoint;
pub mod envelope;
pub mod page;
pub mod query;
pub mod records;

pub use auth::{AuthError, Credential, TokenGrant};
pub use endpoint::{Endpoint, FieldError, FieldSet};
pub use envelope::ApiErrorBody;
pub use page::{Continuation, Cursor, PageState, ProtocolError, ResponsePage, SearchId};
pub use query::{
    ApiRequest, CommentPageRequest, Condition, ConditionField, FieldValue, Operation, PageRequest,
    PlaylistInfoRequest, Predicate, QuerySpec, QuerySpecBuilder, UserInfoRequest, UserPageRequest,
    ValidationError, VideoLength, Violation,
};
pub use records::{Comment, FollowUser, Playlist, UserInfo, Video};
