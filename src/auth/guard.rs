//! Tenant membership enforcement.

use thiserror::Error;

use crate::auth::IdentityContext;
use crate::types::TenantId;

/// Why a caller may not act on a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GuardDenial {
    /// No caller identity could be resolved for the request.
    #[error("No user")]
    NoUser,
    /// The caller belongs to no tenant at all.
    #[error("No tenants found for the user")]
    NoTenants,
    /// The caller has memberships, but not in the requested tenant.
    #[error("Tenant that does not belong")]
    TenantNotBelonged,
}

/// Pure membership predicate consulted before any tenant-scoped call.
pub struct TenantMembershipGuard;

impl TenantMembershipGuard {
    /// Allow the request only when `tenant_id` is one of the caller's tenants.
    pub fn authorize(context: &IdentityContext, tenant_id: &TenantId) -> Result<(), GuardDenial> {
        Self::require_tenants(context)?;
        if context.membership(tenant_id).is_none() {
            return Err(GuardDenial::TenantNotBelonged);
        }
        Ok(())
    }

    /// Allow the request when the caller belongs to at least one tenant.
    pub fn require_tenants(context: &IdentityContext) -> Result<(), GuardDenial> {
        if !context.has_tenants() {
            return Err(GuardDenial::NoTenants);
        }
        Ok(())
    }
}
