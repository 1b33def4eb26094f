//! Authentication extractor for HTTP requests.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::auth::context::IdentityContext;
use crate::identity::{IdentityError, IdentityService};

/// Authentication errors.
#[derive(Debug, Clone)]
pub enum AuthError {
    /// No bearer credentials were provided
    Unauthenticated,
    /// The identity service rejected the ID token
    InvalidToken(String),
    /// The identity service could not be reached or misbehaved
    Upstream(IdentityError),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Unauthenticated => write!(f, "Authentication required"),
            AuthError::InvalidToken(msg) => write!(f, "Invalid token: {}", msg),
            AuthError::Upstream(err) => write!(f, "Identity service error: {}", err),
        }
    }
}

impl std::error::Error for AuthError {}

/// Resolves the caller behind a bearer ID token.
#[derive(Clone)]
pub struct AuthExtractor {
    identity: Arc<dyn IdentityService>,
}

impl AuthExtractor {
    pub fn new(identity: Arc<dyn IdentityService>) -> Self {
        Self { identity }
    }

    /// Extract the caller from an `Authorization` header value.
    pub async fn extract_user(
        &self,
        authorization: Option<&str>,
    ) -> Result<IdentityContext, AuthError> {
        let token = authorization
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::Unauthenticated)?;

        match self.identity.get_user_info(token).await {
            Ok(info) => {
                debug!(user_id = %info.id, tenants = info.tenants.len(), "Resolved caller");
                Ok(IdentityContext::from(info))
            }
            // A 4xx from userinfo means the token itself was refused.
            Err(IdentityError::Service { status, body }) if (400..500).contains(&status) => {
                Err(AuthError::InvalidToken(body.to_string()))
            }
            Err(err) => Err(AuthError::Upstream(err)),
        }
    }
}
