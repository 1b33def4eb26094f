//! Typed boundary over the external identity/authorization service.
//!
//! The gateway never owns accounts, tenants, roles or invitations; it drives
//! them through [`IdentityService`]. The production implementation is
//! [`HttpIdentityClient`], which signs every request with the SaaS
//! credentials from configuration.
//!
//! Every operation is a single remote call. Errors are returned as-is:
//! there are no retries, no fallbacks and no reinterpretation of upstream
//! payloads.

mod client;
mod error;
pub mod model;
#[cfg(test)]
pub(crate) mod testing;

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::attributes::AttributeDefinition;
use crate::types::{PlanId, TenantId, UserId};

pub use client::{HttpIdentityClient, sign_request};
pub use error::IdentityError;
pub use model::{
    CreateSaasUserParam, CreateTenantInvitationParam, CreateTenantParam,
    CreateTenantUserParam, CreateTenantUserRolesParam, CredentialGrant, Credentials,
    Invitation, InvitationEnv, Role, SaasUser, Tenant, TenantUser, UserInfo,
};

pub type IdentityResult<T> = Result<T, IdentityError>;

/// Boxed future returned by [`IdentityService`] operations.
pub type IdentityFuture<'a, T> = Pin<Box<dyn Future<Output = IdentityResult<T>> + Send + 'a>>;

/// Remote operations consumed by the gateway.
pub trait IdentityService: Send + Sync {
    /// Resolve the signed-in user behind an ID token.
    fn get_user_info<'a>(&'a self, id_token: &'a str) -> IdentityFuture<'a, UserInfo>;

    /// Exchange a login code or refresh token for session credentials.
    fn get_credentials<'a>(&'a self, grant: &'a CredentialGrant) -> IdentityFuture<'a, Credentials>;

    /// Create a login account.
    fn create_saas_user<'a>(&'a self, param: &'a CreateSaasUserParam) -> IdentityFuture<'a, SaasUser>;

    fn create_tenant<'a>(&'a self, param: &'a CreateTenantParam) -> IdentityFuture<'a, Tenant>;

    fn get_tenant<'a>(&'a self, tenant_id: &'a TenantId) -> IdentityFuture<'a, Tenant>;

    fn list_tenant_users<'a>(&'a self, tenant_id: &'a TenantId) -> IdentityFuture<'a, Vec<TenantUser>>;

    /// Attach an existing account to a tenant.
    fn create_tenant_user<'a>(
        &'a self,
        tenant_id: &'a TenantId,
        param: &'a CreateTenantUserParam,
    ) -> IdentityFuture<'a, TenantUser>;

    fn get_tenant_user<'a>(
        &'a self,
        tenant_id: &'a TenantId,
        user_id: &'a UserId,
    ) -> IdentityFuture<'a, TenantUser>;

    fn delete_tenant_user<'a>(
        &'a self,
        tenant_id: &'a TenantId,
        user_id: &'a UserId,
    ) -> IdentityFuture<'a, ()>;

    /// The role catalog.
    fn list_roles(&self) -> IdentityFuture<'_, Vec<Role>>;

    /// Grant roles to a membership inside one environment.
    fn create_tenant_user_roles<'a>(
        &'a self,
        tenant_id: &'a TenantId,
        user_id: &'a UserId,
        env_id: u64,
        param: &'a CreateTenantUserRolesParam,
    ) -> IdentityFuture<'a, ()>;

    fn list_tenant_attributes(&self) -> IdentityFuture<'_, Vec<AttributeDefinition>>;

    fn list_user_attributes(&self) -> IdentityFuture<'_, Vec<AttributeDefinition>>;

    fn list_tenant_invitations<'a>(
        &'a self,
        tenant_id: &'a TenantId,
    ) -> IdentityFuture<'a, Vec<Invitation>>;

    fn create_tenant_invitation<'a>(
        &'a self,
        tenant_id: &'a TenantId,
        param: &'a CreateTenantInvitationParam,
    ) -> IdentityFuture<'a, Invitation>;

    /// Billing plan, returned as the billing service serves it.
    fn get_pricing_plan<'a>(&'a self, plan_id: &'a PlanId) -> IdentityFuture<'a, Value>;
}
