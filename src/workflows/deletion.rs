use serde::Deserialize;
use tracing::{error, info};

use crate::audit::{DeletionLogRecord, NewDeletionLog};
use crate::auth::{IdentityContext, TenantMembershipGuard};
use crate::types::{TenantId, UserId};

use super::{WorkflowError, WorkflowResult, Workflows, required};

/// Body of a user deletion request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserDeletion {
    pub tenant_id: String,
    pub user_id: String,
}

impl Workflows {
    /// Remove a user from one of the caller's tenants and record the removal.
    ///
    /// The membership is read first to capture the email, then deleted, then
    /// one audit record is appended. If the lookup or delete fails nothing is
    /// written. If the audit write fails the deletion has already happened
    /// and is not undone.
    pub async fn delete_user(
        &self,
        context: &IdentityContext,
        request: UserDeletion,
    ) -> WorkflowResult<DeletionLogRecord> {
        let (Some(tenant_id), Some(user_id)) =
            (required(&request.tenant_id), required(&request.user_id))
        else {
            return Err(WorkflowError::missing_fields());
        };
        let tenant_id = TenantId::new(tenant_id);
        let user_id = UserId::new(user_id);

        TenantMembershipGuard::authorize(context, &tenant_id)?;

        let member = self.identity.get_tenant_user(&tenant_id, &user_id).await?;
        self.identity.delete_tenant_user(&tenant_id, &user_id).await?;

        let entry = NewDeletionLog::now(tenant_id.clone(), user_id.clone(), member.email);
        let record = self.audit.append(entry).await.map_err(|e| {
            error!(
                tenant_id = %tenant_id,
                user_id = %user_id,
                error = %e,
                "User deleted but audit record was not written"
            );
            e
        })?;

        info!(
            tenant_id = %tenant_id,
            user_id = %user_id,
            deleted_by = %context.user_id(),
            log_id = %record.id,
            "Deleted tenant user"
        );

        Ok(record)
    }
}
