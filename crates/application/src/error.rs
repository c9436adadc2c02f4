//! Client error taxonomy
//!
//! Every failure reaches the caller as a distinct kind so that retry logic
//! can tell retryable causes from fatal ones. Nothing is logged or hidden
//! here.

use thiserror::Error;
use trapi_domain::{ApiErrorBody, AuthError, FieldError, ProtocolError, ValidationError};

use crate::ports::TransportError;

/// A 4xx other than 401, or an API-level error in a success envelope.
///
/// Not retryable; usually a defect in the calling code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// The server rejected the request with a client error status.
    #[error("request rejected with status {status}: {error}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Error member of the response.
        error: ApiErrorBody,
    },

    /// The server answered 2xx but reported an error code.
    #[error("API error: {error}")]
    Api {
        /// Error member of the response.
        error: ApiErrorBody,
    },

    /// The request could not be addressed.
    #[error("invalid request target: {message}")]
    InvalidTarget {
        /// Error description.
        message: String,
    },

    /// The request body could not be encoded.
    #[error("failed to encode request: {message}")]
    Encode {
        /// Error description.
        message: String,
    },
}

impl RequestError {
    /// Returns the API error body, if the server sent one.
    #[must_use]
    pub const fn api_error(&self) -> Option<&ApiErrorBody> {
        match self {
            Self::Rejected { error, .. } | Self::Api { error } => Some(error),
            Self::InvalidTarget { .. } | Self::Encode { .. } => None,
        }
    }
}

/// A failure that may succeed when retried later.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransientError {
    /// 429 or 5xx.
    #[error("server returned status {status}: {error}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error member of the response.
        error: ApiErrorBody,
    },

    /// No response was received.
    #[error(transparent)]
    Transport(TransportError),
}

/// Error returned by every client operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Credential exchange failed or the credential was rejected.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The request was malformed and never sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The field projection was empty or unknown.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// The server rejected the request.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Network failure, 429 or 5xx.
    #[error(transparent)]
    Transient(#[from] TransientError),

    /// The response broke the pagination contract.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl ClientError {
    /// Returns true only for [`ClientError::Transient`].
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Classifies a non-success HTTP status.
    ///
    /// 401 rejects the credential, 429 and 5xx are transient, everything
    /// else is a request error.
    #[must_use]
    pub fn from_status(status: u16, error: ApiErrorBody) -> Self {
        match status {
            401 => Self::Auth(AuthError::Rejected {
                status,
                message: error.to_string(),
            }),
            429 | 500..=599 => Self::Transient(TransientError::Status { status, error }),
            _ => Self::Request(RequestError::Rejected { status, error }),
        }
    }
}

impl From<TransportError> for ClientError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::InvalidUrl { message } => {
                Self::Request(RequestError::InvalidTarget { message })
            }
            TransportError::Decode { message } => Self::Protocol(ProtocolError::malformed(message)),
            other => Self::Transient(TransientError::Transport(other)),
        }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
