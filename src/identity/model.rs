//! Wire types exchanged with the identity service.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::attributes::{AttributeDefinition, AttributeValueMap};
use crate::types::{Email, PlanId, RoleName, TenantId, UserId};

/// Role as listed in the catalog or attached to an environment membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub role_name: RoleName,
    #[serde(default)]
    pub display_name: String,
}

impl Role {
    pub fn new(role_name: impl Into<String>) -> Self {
        let role_name = role_name.into();
        Self {
            display_name: role_name.clone(),
            role_name: RoleName::new(role_name),
        }
    }
}

/// Roles held in one environment of a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentRoles {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub roles: Vec<Role>,
}

/// A tenant as seen from the signed-in user's `userinfo`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfoTenant {
    pub id: TenantId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub plan_id: Option<PlanId>,
    #[serde(default)]
    pub envs: Vec<EnvironmentRoles>,
}

/// Response of `GET /userinfo`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: UserId,
    pub email: Email,
    #[serde(default)]
    pub tenants: Vec<UserInfoTenant>,
}

/// Session tokens returned by the credential exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub id_token: String,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// How to obtain credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialGrant {
    /// One-time code handed to the browser by the hosted login callback.
    TempCode(String),
    /// Long-lived refresh token from the session cookie.
    RefreshToken(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateSaasUserParam {
    pub email: Email,
    pub password: String,
}

/// Account as returned by `POST /users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaasUser {
    pub id: UserId,
    pub email: Email,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateTenantParam {
    pub name: String,
    pub attributes: AttributeValueMap,
    pub back_office_staff_email: Email,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub back_office_staff_email: Option<Email>,
    #[serde(default)]
    pub plan_id: Option<PlanId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateTenantUserParam {
    pub email: Email,
    pub attributes: AttributeValueMap,
}

/// A user's membership in one tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantUser {
    pub id: UserId,
    pub tenant_id: TenantId,
    pub email: Email,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub envs: Vec<EnvironmentRoles>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateTenantUserRolesParam {
    pub role_names: Vec<RoleName>,
}

/// Target environment and roles granted when an invitation is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitationEnv {
    pub id: u64,
    pub role_names: Vec<RoleName>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateTenantInvitationParam {
    pub email: Email,
    /// Access token of the inviting user, forwarded verbatim.
    pub access_token: String,
    pub envs: Vec<InvitationEnv>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invitation {
    pub id: String,
    pub email: Email,
    #[serde(default)]
    pub envs: Vec<Value>,
    #[serde(default)]
    pub expired_at: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
}

// List envelopes as served by the identity service.

#[derive(Debug, Deserialize)]
pub(crate) struct RolesEnvelope {
    pub roles: Vec<Role>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TenantUsersEnvelope {
    pub users: Vec<TenantUser>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InvitationsEnvelope {
    pub invitations: Vec<Invitation>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TenantAttributesEnvelope {
    pub tenant_attributes: Vec<AttributeDefinition>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserAttributesEnvelope {
    pub user_attributes: Vec<AttributeDefinition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_userinfo_deserialization() {
        let json = r#"{
            "id": "u1",
            "email": "owner@example.com",
            "tenants": [{
                "id": "t1",
                "name": "Acme",
                "plan_id": "p1",
                "completed_sign_up": true,
                "envs": [{
                    "id": 3,
                    "name": "prod",
                    "display_name": "Production",
                    "roles": [{"role_name": "admin", "display_name": "Admin"}]
                }]
            }]
        }"#;

        let info: UserInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.id.as_str(), "u1");
        assert_eq!(info.tenants.len(), 1);
        assert_eq!(info.tenants[0].envs[0].roles[0].role_name.as_str(), "admin");
        assert_eq!(info.tenants[0].plan_id, Some(PlanId::new("p1")));
    }

    #[test]
    fn test_userinfo_without_tenants() {
        let info: UserInfo =
            serde_json::from_str(r#"{"id": "u1", "email": "x@example.com"}"#).unwrap();
        assert!(info.tenants.is_empty());
    }

    #[test]
    fn test_invitation_param_serialization() {
        let param = CreateTenantInvitationParam {
            email: Email::new("new@example.com"),
            access_token: "tok".to_string(),
            envs: vec![InvitationEnv {
                id: 3,
                role_names: vec![RoleName::new("admin")],
            }],
        };
        let value = serde_json::to_value(&param).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "email": "new@example.com",
                "access_token": "tok",
                "envs": [{"id": 3, "role_names": ["admin"]}]
            })
        );
    }
}
