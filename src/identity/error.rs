//! Errors surfaced by the identity service boundary.

use serde_json::Value;
use thiserror::Error;

/// Failure talking to the identity or billing service.
///
/// The facade never retries or reinterprets these; workflows propagate them
/// to the HTTP layer, which reports the payload verbatim.
#[derive(Debug, Clone, Error)]
pub enum IdentityError {
    /// The request never produced an HTTP response.
    #[error("identity service unreachable: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("identity service returned {status}: {body}")]
    Service { status: u16, body: Value },

    /// The service answered 2xx but the body did not match the expected shape.
    #[error("unexpected identity service response: {0}")]
    Decode(String),

    /// A request URL could not be built from the configured base.
    #[error("invalid identity service url: {0}")]
    InvalidUrl(String),
}

impl IdentityError {
    /// Payload to hand back to the client.
    pub fn payload(&self) -> Value {
        match self {
            Self::Service { body, .. } => body.clone(),
            other => Value::String(other.to_string()),
        }
    }

    /// HTTP status reported by the service, if it answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Service { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for IdentityError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for IdentityError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<url::ParseError> for IdentityError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}
