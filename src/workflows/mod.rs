//! Tenant-scoped orchestration workflows.
//!
//! Each workflow receives the caller's [`IdentityContext`] explicitly,
//! consults [`TenantMembershipGuard`](crate::auth::TenantMembershipGuard)
//! when it targets a tenant, normalizes attributes where they are involved,
//! and then drives the identity service one call at a time.
//!
//! Multi-step workflows are not atomic. A failure part-way leaves earlier
//! remote effects in place; nothing is compensated or retried.
//!
//! [`IdentityContext`]: crate::auth::IdentityContext

mod deletion;
mod error;
mod invitation;
mod projection;
mod queries;
mod registration;
mod sign_up;

use std::sync::Arc;

use crate::audit::AuditLogStore;
use crate::config::EnvironmentConfig;
use crate::identity::IdentityService;

pub use deletion::UserDeletion;
pub use error::{WorkflowError, WorkflowResult};
pub use invitation::InvitationRequest;
pub use projection::{ProjectedAttribute, TenantAttributeProjection};
pub use registration::{UserRegistration, select_registration_role};
pub use sign_up::SelfSignUp;

/// Shared handles for all workflows. Cheap to clone.
#[derive(Clone)]
pub struct Workflows {
    identity: Arc<dyn IdentityService>,
    audit: Arc<dyn AuditLogStore>,
    environments: EnvironmentConfig,
}

impl Workflows {
    pub fn new(
        identity: Arc<dyn IdentityService>,
        audit: Arc<dyn AuditLogStore>,
        environments: EnvironmentConfig,
    ) -> Self {
        Self {
            identity,
            audit,
            environments,
        }
    }

    pub fn identity(&self) -> &Arc<dyn IdentityService> {
        &self.identity
    }
}

/// Trimmed, non-empty value of a required text field.
fn required(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
