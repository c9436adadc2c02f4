//! The `error` member shared by every response envelope.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Code the API reports when a request succeeded.
pub const OK_CODE: &str = "ok";

/// Error information returned alongside `data` in every response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Error code, `"ok"` on success.
    #[serde(default)]
    pub code: Option<String>,
    /// Error message.
    #[serde(default)]
    pub message: Option<String>,
    /// Log identifier for the failed call.
    #[serde(default)]
    pub log_id: Option<String>,
}

impl ApiErrorBody {
    /// Builds an error body carrying only a message, for responses that
    /// did not include a structured `error` member.
    #[must_use]
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: Some(message.into()),
            log_id: None,
        }
    }

    /// Returns true when the body reports a failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.code
            .as_deref()
            .is_some_and(|code| !code.eq_ignore_ascii_case(OK_CODE))
    }
}

impl fmt::Display for ApiErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code.as_deref().unwrap_or("unknown_error"))?;
        if let Some(message) = self.message.as_deref().filter(|m| !m.is_empty()) {
            write!(f, ": {message}")?;
        }
        if let Some(log_id) = &self.log_id {
            write!(f, " (log_id {log_id})")?;
        }
        Ok(())
    }
}
