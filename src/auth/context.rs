//! Caller identity for request-scoped operations.

use serde::{Deserialize, Serialize};

use crate::identity::UserInfo;
use crate::identity::model::{EnvironmentRoles, UserInfoTenant};
use crate::types::{Email, PlanId, TenantId, UserId};

/// One tenant the caller belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantMembership {
    id: TenantId,
    name: String,
    #[serde(default)]
    plan_id: Option<PlanId>,
    #[serde(default)]
    envs: Vec<EnvironmentRoles>,
}

impl TenantMembership {
    pub fn new(id: impl Into<TenantId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            plan_id: None,
            envs: Vec::new(),
        }
    }

    pub fn id(&self) -> &TenantId {
        &self.id
    }
}

impl From<UserInfoTenant> for TenantMembership {
    fn from(tenant: UserInfoTenant) -> Self {
        Self {
            id: tenant.id,
            name: tenant.name,
            plan_id: tenant.plan_id,
            envs: tenant.envs,
        }
    }
}

/// The authenticated caller, resolved once per request.
///
/// Immutable once built. Workflows receive it explicitly and never persist it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityContext {
    id: UserId,
    email: Email,
    tenants: Vec<TenantMembership>,
}

impl IdentityContext {
    pub fn new(id: impl Into<UserId>, email: impl Into<Email>, tenants: Vec<TenantMembership>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            tenants,
        }
    }

    /// Get the caller's user id.
    pub fn user_id(&self) -> &UserId {
        &self.id
    }

    /// Get the caller's email.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Memberships in the order the identity service listed them.
    pub fn tenants(&self) -> &[TenantMembership] {
        &self.tenants
    }

    pub fn has_tenants(&self) -> bool {
        !self.tenants.is_empty()
    }

    /// Look up the membership for `tenant_id`.
    pub fn membership(&self, tenant_id: &TenantId) -> Option<&TenantMembership> {
        self.tenants.iter().find(|t| t.id() == tenant_id)
    }
}

impl From<UserInfo> for IdentityContext {
    fn from(info: UserInfo) -> Self {
        Self {
            id: info.id,
            email: info.email,
            tenants: info.tenants.into_iter().map(TenantMembership::from).collect(),
        }
    }
}
