//! Recording in-memory [`IdentityService`] for workflow and router tests.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::{Value, json};

use crate::attributes::AttributeDefinition;
use crate::identity::{
    CreateSaasUserParam, CreateTenantInvitationParam, CreateTenantParam, CreateTenantUserParam,
    CreateTenantUserRolesParam, CredentialGrant, Credentials, IdentityError, IdentityFuture,
    IdentityResult, IdentityService, Invitation, Role, SaasUser, Tenant, TenantUser, UserInfo,
};
use crate::types::{Email, PlanId, TenantId, UserId};

/// One recorded call: operation name and its arguments as JSON.
pub(crate) type Call = (String, Value);

pub(crate) struct FakeIdentity {
    calls: Mutex<Vec<Call>>,
    roles: Vec<Role>,
    tenant_attributes: Vec<AttributeDefinition>,
    user_attributes: Vec<AttributeDefinition>,
    tenant_attribute_values: serde_json::Map<String, Value>,
    sessions: HashMap<String, UserInfo>,
    failing: Vec<&'static str>,
}

impl FakeIdentity {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            roles: vec![Role::new("admin"), Role::new("user")],
            tenant_attributes: Vec::new(),
            user_attributes: Vec::new(),
            tenant_attribute_values: serde_json::Map::new(),
            sessions: HashMap::new(),
            failing: Vec::new(),
        }
    }

    pub fn with_roles(mut self, names: &[&str]) -> Self {
        self.roles = names.iter().map(|n| Role::new(*n)).collect();
        self
    }

    pub fn with_tenant_attributes(mut self, definitions: Vec<AttributeDefinition>) -> Self {
        self.tenant_attributes = definitions;
        self
    }

    pub fn with_user_attributes(mut self, definitions: Vec<AttributeDefinition>) -> Self {
        self.user_attributes = definitions;
        self
    }

    /// Attribute values carried by every tenant returned from `get_tenant`.
    pub fn with_tenant_values(mut self, values: Value) -> Self {
        if let Value::Object(map) = values {
            self.tenant_attribute_values = map;
        }
        self
    }

    /// Accept `token` as an ID token resolving to `info`.
    pub fn with_session(mut self, token: &str, info: UserInfo) -> Self {
        self.sessions.insert(token.to_string(), info);
        self
    }

    /// Make the named operation fail with a 500 service error.
    pub fn failing(mut self, operation: &'static str) -> Self {
        self.failing.push(operation);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_names(&self) -> Vec<String> {
        self.calls().into_iter().map(|(name, _)| name).collect()
    }

    /// Arguments of every recorded call to `operation`.
    pub fn calls_to(&self, operation: &str) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter(|(name, _)| name == operation)
            .map(|(_, args)| args)
            .collect()
    }

    fn record(&self, operation: &'static str, args: Value) -> IdentityResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push((operation.to_string(), args));
        if self.failing.contains(&operation) {
            return Err(IdentityError::Service {
                status: 500,
                body: json!({"message": format!("{} failed", operation)}),
            });
        }
        Ok(())
    }
}

impl IdentityService for FakeIdentity {
    fn get_user_info<'a>(&'a self, id_token: &'a str) -> IdentityFuture<'a, UserInfo> {
        Box::pin(async move {
            self.record("get_user_info", json!({"token": id_token}))?;
            self.sessions
                .get(id_token)
                .cloned()
                .ok_or_else(|| IdentityError::Service {
                    status: 401,
                    body: json!({"message": "invalid token"}),
                })
        })
    }

    fn get_credentials<'a>(&'a self, grant: &'a CredentialGrant) -> IdentityFuture<'a, Credentials> {
        Box::pin(async move {
            let (args, refresh_token) = match grant {
                CredentialGrant::TempCode(code) => {
                    (json!({"code": code}), Some("refresh-from-code".to_string()))
                }
                CredentialGrant::RefreshToken(token) => (json!({"refresh_token": token}), None),
            };
            self.record("get_credentials", args)?;
            Ok(Credentials {
                id_token: "id-token".to_string(),
                access_token: "access-token".to_string(),
                refresh_token,
            })
        })
    }

    fn create_saas_user<'a>(&'a self, param: &'a CreateSaasUserParam) -> IdentityFuture<'a, SaasUser> {
        Box::pin(async move {
            self.record("create_saas_user", json!({"email": param.email}))?;
            Ok(SaasUser {
                id: UserId::new("new-user"),
                email: param.email.clone(),
            })
        })
    }

    fn create_tenant<'a>(&'a self, param: &'a CreateTenantParam) -> IdentityFuture<'a, Tenant> {
        Box::pin(async move {
            self.record("create_tenant", serde_json::to_value(param).unwrap())?;
            let attributes = param
                .attributes
                .iter()
                .map(|(k, v)| (k.clone(), Value::from(v.clone())))
                .collect();
            Ok(Tenant {
                id: TenantId::new("new-tenant"),
                name: param.name.clone(),
                attributes,
                back_office_staff_email: Some(param.back_office_staff_email.clone()),
                plan_id: None,
            })
        })
    }

    fn get_tenant<'a>(&'a self, tenant_id: &'a TenantId) -> IdentityFuture<'a, Tenant> {
        Box::pin(async move {
            self.record("get_tenant", json!({"tenant_id": tenant_id}))?;
            Ok(Tenant {
                id: tenant_id.clone(),
                name: "Acme".to_string(),
                attributes: self.tenant_attribute_values.clone(),
                back_office_staff_email: None,
                plan_id: None,
            })
        })
    }

    fn list_tenant_users<'a>(&'a self, tenant_id: &'a TenantId) -> IdentityFuture<'a, Vec<TenantUser>> {
        Box::pin(async move {
            self.record("list_tenant_users", json!({"tenant_id": tenant_id}))?;
            Ok(vec![member(tenant_id, &UserId::new("u1"))])
        })
    }

    fn create_tenant_user<'a>(
        &'a self,
        tenant_id: &'a TenantId,
        param: &'a CreateTenantUserParam,
    ) -> IdentityFuture<'a, TenantUser> {
        Box::pin(async move {
            self.record(
                "create_tenant_user",
                json!({"tenant_id": tenant_id, "email": param.email, "attributes": param.attributes}),
            )?;
            Ok(TenantUser {
                id: UserId::new("new-user"),
                tenant_id: tenant_id.clone(),
                email: param.email.clone(),
                attributes: serde_json::Map::new(),
                envs: Vec::new(),
            })
        })
    }

    fn get_tenant_user<'a>(
        &'a self,
        tenant_id: &'a TenantId,
        user_id: &'a UserId,
    ) -> IdentityFuture<'a, TenantUser> {
        Box::pin(async move {
            self.record(
                "get_tenant_user",
                json!({"tenant_id": tenant_id, "user_id": user_id}),
            )?;
            Ok(member(tenant_id, user_id))
        })
    }

    fn delete_tenant_user<'a>(
        &'a self,
        tenant_id: &'a TenantId,
        user_id: &'a UserId,
    ) -> IdentityFuture<'a, ()> {
        Box::pin(async move {
            self.record(
                "delete_tenant_user",
                json!({"tenant_id": tenant_id, "user_id": user_id}),
            )
        })
    }

    fn list_roles(&self) -> IdentityFuture<'_, Vec<Role>> {
        Box::pin(async move {
            self.record("list_roles", Value::Null)?;
            Ok(self.roles.clone())
        })
    }

    fn create_tenant_user_roles<'a>(
        &'a self,
        tenant_id: &'a TenantId,
        user_id: &'a UserId,
        env_id: u64,
        param: &'a CreateTenantUserRolesParam,
    ) -> IdentityFuture<'a, ()> {
        Box::pin(async move {
            self.record(
                "create_tenant_user_roles",
                json!({
                    "tenant_id": tenant_id,
                    "user_id": user_id,
                    "env_id": env_id,
                    "role_names": param.role_names,
                }),
            )
        })
    }

    fn list_tenant_attributes(&self) -> IdentityFuture<'_, Vec<AttributeDefinition>> {
        Box::pin(async move {
            self.record("list_tenant_attributes", Value::Null)?;
            Ok(self.tenant_attributes.clone())
        })
    }

    fn list_user_attributes(&self) -> IdentityFuture<'_, Vec<AttributeDefinition>> {
        Box::pin(async move {
            self.record("list_user_attributes", Value::Null)?;
            Ok(self.user_attributes.clone())
        })
    }

    fn list_tenant_invitations<'a>(
        &'a self,
        tenant_id: &'a TenantId,
    ) -> IdentityFuture<'a, Vec<Invitation>> {
        Box::pin(async move {
            self.record("list_tenant_invitations", json!({"tenant_id": tenant_id}))?;
            Ok(vec![Invitation {
                id: "inv-0".to_string(),
                email: Email::new("pending@example.com"),
                envs: Vec::new(),
                expired_at: None,
                status: Some("pending".to_string()),
            }])
        })
    }

    fn create_tenant_invitation<'a>(
        &'a self,
        tenant_id: &'a TenantId,
        param: &'a CreateTenantInvitationParam,
    ) -> IdentityFuture<'a, Invitation> {
        Box::pin(async move {
            let mut args = serde_json::to_value(param).unwrap();
            args["tenant_id"] = json!(tenant_id);
            self.record("create_tenant_invitation", args)?;
            Ok(Invitation {
                id: "inv-1".to_string(),
                email: param.email.clone(),
                envs: Vec::new(),
                expired_at: None,
                status: Some("pending".to_string()),
            })
        })
    }

    fn get_pricing_plan<'a>(&'a self, plan_id: &'a PlanId) -> IdentityFuture<'a, Value> {
        Box::pin(async move {
            self.record("get_pricing_plan", json!({"plan_id": plan_id}))?;
            Ok(json!({"id": plan_id, "name": "Standard"}))
        })
    }
}

/// Membership returned for any lookup; email is derived from the user id.
fn member(tenant_id: &TenantId, user_id: &UserId) -> TenantUser {
    TenantUser {
        id: user_id.clone(),
        tenant_id: tenant_id.clone(),
        email: Email::new(format!("{}@example.com", user_id)),
        attributes: serde_json::Map::new(),
        envs: Vec::new(),
    }
}
