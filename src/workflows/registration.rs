use serde::Deserialize;
use tracing::info;

use crate::attributes::{AttributeValueMap, coerce};
use crate::auth::{IdentityContext, TenantMembershipGuard};
use crate::identity::{
    CreateSaasUserParam, CreateTenantUserParam, CreateTenantUserRolesParam, Role, TenantUser,
};
use crate::types::{ADMIN_ROLE, Email, RoleName, TenantId, USER_ROLE};

use super::{WorkflowError, WorkflowResult, Workflows, required};

/// Body of a user registration request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRegistration {
    pub email: String,
    pub password: String,
    pub tenant_id: String,
    pub user_attribute_values: Option<AttributeValueMap>,
}

/// Role granted to newly registered users: `user` when the catalog has it,
/// otherwise `admin`.
pub fn select_registration_role(catalog: &[Role]) -> RoleName {
    if catalog.iter().any(|r| r.role_name.as_str() == USER_ROLE) {
        RoleName::new(USER_ROLE)
    } else {
        RoleName::new(ADMIN_ROLE)
    }
}

impl Workflows {
    /// Create an account, attach it to one of the caller's tenants and grant
    /// it a role in the configured environment.
    ///
    /// Steps run in order: create account, create membership, read role
    /// catalog, assign role. A failure part-way leaves the earlier steps in
    /// place.
    pub async fn register_user(
        &self,
        context: &IdentityContext,
        request: UserRegistration,
    ) -> WorkflowResult<TenantUser> {
        let (Some(email), Some(tenant_id)) = (required(&request.email), required(&request.tenant_id))
        else {
            return Err(WorkflowError::missing_fields());
        };
        if request.password.is_empty() {
            return Err(WorkflowError::missing_fields());
        }
        let email = Email::new(email);
        let tenant_id = TenantId::new(tenant_id);

        TenantMembershipGuard::authorize(context, &tenant_id)?;

        let definitions = self.identity.list_user_attributes().await?;
        let attributes = coerce(
            request.user_attribute_values.unwrap_or_default(),
            &definitions,
        )?;

        self.identity
            .create_saas_user(&CreateSaasUserParam {
                email: email.clone(),
                password: request.password,
            })
            .await?;

        let tenant_user = self
            .identity
            .create_tenant_user(&tenant_id, &CreateTenantUserParam { email, attributes })
            .await?;

        let catalog = self.identity.list_roles().await?;
        let role = select_registration_role(&catalog);

        self.identity
            .create_tenant_user_roles(
                &tenant_id,
                &tenant_user.id,
                self.environments.role_env_id,
                &CreateTenantUserRolesParam {
                    role_names: vec![role.clone()],
                },
            )
            .await?;

        info!(
            tenant_id = %tenant_id,
            user_id = %tenant_user.id,
            role = %role,
            registered_by = %context.user_id(),
            "Registered tenant user"
        );

        Ok(tenant_user)
    }
}
