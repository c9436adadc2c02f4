//! Query construction and validation
//!
//! Requests are validated before they are sent. Building a request collects
//! every violation at once so a caller can fix them in a single pass.

mod condition;
mod date_format;
mod error;
mod request;
mod spec;

pub use condition::{Condition, ConditionField, FieldValue, Operation, Predicate, VideoLength};
pub use error::{ValidationError, Violation};
pub use request::{
    ApiRequest, CommentPageRequest, MAX_COUNT_LIMIT, PageRequest, PlaylistInfoRequest,
    UserInfoRequest, UserPageRequest,
};
pub use spec::{MAX_WINDOW_DAYS, QuerySpec, QuerySpecBuilder};
