use thiserror::Error;

use crate::attributes::CoercionError;
use crate::audit::AuditError;
use crate::auth::GuardDenial;
use crate::identity::IdentityError;

/// Everything a workflow can fail with.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A required field is missing or a value is malformed.
    #[error("{0}")]
    Validation(String),

    /// The caller may not act on the requested tenant.
    #[error(transparent)]
    Authorization(#[from] GuardDenial),

    /// A credential the operation needs was not supplied.
    #[error("{0}")]
    Authentication(String),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Audit(#[from] AuditError),
}

impl WorkflowError {
    pub fn missing_fields() -> Self {
        Self::Validation("Missing required fields".to_string())
    }
}

impl From<CoercionError> for WorkflowError {
    fn from(err: CoercionError) -> Self {
        Self::Validation(err.to_string())
    }
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;
