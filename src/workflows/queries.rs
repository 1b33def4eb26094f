//! Read-only, guarded lookups.

use serde_json::Value;

use crate::attributes::AttributeDefinition;
use crate::audit::DeletionLogRecord;
use crate::auth::{IdentityContext, TenantMembershipGuard};
use crate::identity::TenantUser;
use crate::types::{PlanId, TenantId};

use super::{WorkflowError, WorkflowResult, Workflows, required};

impl Workflows {
    /// Members of one of the caller's tenants.
    pub async fn list_tenant_users(
        &self,
        context: &IdentityContext,
        tenant_id: &TenantId,
    ) -> WorkflowResult<Vec<TenantUser>> {
        TenantMembershipGuard::authorize(context, tenant_id)?;
        Ok(self.identity.list_tenant_users(tenant_id).await?)
    }

    /// Deletion records of one of the caller's tenants, oldest first.
    pub async fn deletion_log(
        &self,
        context: &IdentityContext,
        tenant_id: &TenantId,
    ) -> WorkflowResult<Vec<DeletionLogRecord>> {
        TenantMembershipGuard::authorize(context, tenant_id)?;
        Ok(self.audit.list_for_tenant(tenant_id).await?)
    }

    /// A billing plan, for callers that belong to at least one tenant.
    pub async fn pricing_plan(
        &self,
        context: &IdentityContext,
        plan_id: &str,
    ) -> WorkflowResult<Value> {
        TenantMembershipGuard::require_tenants(context)?;
        let Some(plan_id) = required(plan_id) else {
            return Err(WorkflowError::Validation(
                "No price plan found for the tenant".to_string(),
            ));
        };
        Ok(self.identity.get_pricing_plan(&PlanId::new(plan_id)).await?)
    }

    pub async fn tenant_attribute_definitions(&self) -> WorkflowResult<Vec<AttributeDefinition>> {
        Ok(self.identity.list_tenant_attributes().await?)
    }

    pub async fn user_attribute_definitions(&self) -> WorkflowResult<Vec<AttributeDefinition>> {
        Ok(self.identity.list_user_attributes().await?)
    }
}
