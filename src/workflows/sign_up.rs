use serde::Deserialize;
use tracing::info;

use crate::attributes::{AttributeValueMap, coerce};
use crate::auth::IdentityContext;
use crate::identity::{
    CreateTenantParam, CreateTenantUserParam, CreateTenantUserRolesParam, Tenant,
};
use crate::types::{ADMIN_ROLE, RoleName};

use super::{WorkflowError, WorkflowResult, Workflows, required};

/// Body of a self sign-up request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelfSignUp {
    pub tenant_name: String,
    pub tenant_attribute_values: Option<AttributeValueMap>,
    pub user_attribute_values: Option<AttributeValueMap>,
}

impl Workflows {
    /// Create a new tenant owned by the caller and make the caller its admin.
    ///
    /// No membership guard applies: the caller is creating the tenant.
    /// Steps: create tenant, attach caller, grant `admin`. Earlier steps stand
    /// if a later one fails.
    pub async fn self_sign_up(
        &self,
        context: &IdentityContext,
        request: SelfSignUp,
    ) -> WorkflowResult<Tenant> {
        let Some(tenant_name) = required(&request.tenant_name) else {
            return Err(WorkflowError::Validation("Missing tenant name".to_string()));
        };

        let tenant_definitions = self.identity.list_tenant_attributes().await?;
        let tenant_attributes = coerce(
            request.tenant_attribute_values.unwrap_or_default(),
            &tenant_definitions,
        )?;

        let tenant = self
            .identity
            .create_tenant(&CreateTenantParam {
                name: tenant_name.to_string(),
                attributes: tenant_attributes,
                back_office_staff_email: context.email().clone(),
            })
            .await?;

        let user_definitions = self.identity.list_user_attributes().await?;
        let user_attributes = coerce(
            request.user_attribute_values.unwrap_or_default(),
            &user_definitions,
        )?;

        let tenant_user = self
            .identity
            .create_tenant_user(
                &tenant.id,
                &CreateTenantUserParam {
                    email: context.email().clone(),
                    attributes: user_attributes,
                },
            )
            .await?;

        self.identity
            .create_tenant_user_roles(
                &tenant.id,
                &tenant_user.id,
                self.environments.role_env_id,
                &CreateTenantUserRolesParam {
                    role_names: vec![RoleName::new(ADMIN_ROLE)],
                },
            )
            .await?;

        info!(
            tenant_id = %tenant.id,
            user_id = %tenant_user.id,
            "Tenant created by self sign-up"
        );

        Ok(tenant)
    }
}
