use serde::Deserialize;
use tracing::info;

use crate::auth::{IdentityContext, TenantMembershipGuard};
use crate::identity::{CreateTenantInvitationParam, Invitation, InvitationEnv};
use crate::types::{ADMIN_ROLE, Email, RoleName, TenantId};

use super::{WorkflowError, WorkflowResult, Workflows, required};

/// Body of an invitation request. The issuer's access token travels in a
/// header and is supplied separately.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvitationRequest {
    pub email: String,
    pub tenant_id: String,
}

impl Workflows {
    /// Invite `email` to one of the caller's tenants as `admin` of the
    /// configured invitation environment.
    pub async fn invite_user(
        &self,
        context: &IdentityContext,
        request: InvitationRequest,
        access_token: Option<&str>,
    ) -> WorkflowResult<Invitation> {
        let (Some(email), Some(tenant_id)) =
            (required(&request.email), required(&request.tenant_id))
        else {
            return Err(WorkflowError::missing_fields());
        };
        let tenant_id = TenantId::new(tenant_id);

        TenantMembershipGuard::authorize(context, &tenant_id)?;

        let Some(access_token) = access_token.and_then(required) else {
            return Err(WorkflowError::Authentication(
                "Access token is missing".to_string(),
            ));
        };

        let param = CreateTenantInvitationParam {
            email: Email::new(email),
            access_token: access_token.to_string(),
            envs: vec![InvitationEnv {
                id: self.environments.invitation_env_id,
                role_names: vec![RoleName::new(ADMIN_ROLE)],
            }],
        };

        let invitation = self
            .identity
            .create_tenant_invitation(&tenant_id, &param)
            .await?;

        info!(
            tenant_id = %tenant_id,
            invitation_id = %invitation.id,
            invited_by = %context.user_id(),
            "Created tenant invitation"
        );

        Ok(invitation)
    }

    /// Invitations issued for one of the caller's tenants.
    pub async fn list_invitations(
        &self,
        context: &IdentityContext,
        tenant_id: &TenantId,
    ) -> WorkflowResult<Vec<Invitation>> {
        TenantMembershipGuard::authorize(context, tenant_id)?;
        Ok(self.identity.list_tenant_invitations(tenant_id).await?)
    }
}
