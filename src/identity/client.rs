//! HTTP implementation of [`IdentityService`].

use std::time::Duration;

use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sha2::Sha256;
use tracing::{debug, warn};
use url::{Position, Url};

use crate::attributes::AttributeDefinition;
use crate::config::IdentityConfig;
use crate::identity::model::{
    InvitationsEnvelope, RolesEnvelope, TenantAttributesEnvelope, TenantUsersEnvelope,
    UserAttributesEnvelope,
};
use crate::identity::{
    CreateSaasUserParam, CreateTenantInvitationParam, CreateTenantParam, CreateTenantUserParam,
    CreateTenantUserRolesParam, CredentialGrant, Credentials, IdentityError, IdentityFuture,
    IdentityResult, IdentityService, Invitation, Role, SaasUser, Tenant, TenantUser, UserInfo,
};
use crate::types::{PlanId, TenantId, UserId};

type HmacSha256 = Hmac<Sha256>;

/// Build the `Authorization` header value for a signed request.
///
/// The signature is a hex HMAC-SHA256 over the unix timestamp, API key,
/// HTTP method, host (with port when explicit), path with query, and the raw
/// request body.
pub fn sign_request(
    secret_key: &str,
    saas_id: &str,
    api_key: &str,
    timestamp: i64,
    method: &str,
    url: &Url,
    body: &[u8],
) -> String {
    let host = match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    };

    let mut mac =
        HmacSha256::new_from_slice(secret_key.as_bytes()).expect("HMAC can take key of any size");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(api_key.as_bytes());
    mac.update(method.as_bytes());
    mac.update(host.as_bytes());
    mac.update(url[Position::BeforePath..].as_bytes());
    mac.update(body);
    let signature = hex::encode(mac.finalize().into_bytes());

    format!(
        "SAASUSSIGV1 Sig={}, SaasID={}, APIKey={}",
        signature, saas_id, api_key
    )
}

/// Signed HTTP client for the identity (`/auth`) and billing (`/pricing`) APIs.
pub struct HttpIdentityClient {
    auth_base: Url,
    pricing_base: Url,
    saas_id: String,
    api_key: String,
    secret_key: String,
    client: reqwest::Client,
}

impl HttpIdentityClient {
    pub fn new(config: &IdentityConfig) -> IdentityResult<Self> {
        let api_base = Url::parse(&config.api_base)?;
        let auth_base = endpoint(&api_base, &["auth"])?;
        let pricing_base = endpoint(&api_base, &["pricing"])?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            auth_base,
            pricing_base,
            saas_id: config.saas_id.clone(),
            api_key: config.api_key.clone(),
            secret_key: config.secret_key.clone(),
            client,
        })
    }

    fn auth_url(&self, segments: &[&str]) -> IdentityResult<Url> {
        endpoint(&self.auth_base, segments)
    }

    /// Send a signed request and return the raw success body.
    async fn send(&self, method: Method, url: Url, body: Vec<u8>) -> IdentityResult<Vec<u8>> {
        let authorization = sign_request(
            &self.secret_key,
            &self.saas_id,
            &self.api_key,
            Utc::now().timestamp(),
            method.as_str(),
            &url,
            &body,
        );

        debug!(method = %method, path = %url.path(), "Calling identity service");

        let mut request = self
            .client
            .request(method, url)
            .header(AUTHORIZATION, authorization);
        if !body.is_empty() {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let body = serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
            warn!(status = status.as_u16(), "Identity service returned an error");
            return Err(IdentityError::Service {
                status: status.as_u16(),
                body,
            });
        }

        Ok(bytes.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> IdentityResult<T> {
        let bytes = self.send(Method::GET, url, Vec::new()).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn post_json<B, T>(&self, url: Url, body: &B) -> IdentityResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let bytes = self.send(Method::POST, url, serde_json::to_vec(body)?).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn post_no_content<B: Serialize + ?Sized>(&self, url: Url, body: &B) -> IdentityResult<()> {
        self.send(Method::POST, url, serde_json::to_vec(body)?).await?;
        Ok(())
    }

    async fn delete(&self, url: Url) -> IdentityResult<()> {
        self.send(Method::DELETE, url, Vec::new()).await?;
        Ok(())
    }
}

/// Append percent-encoded path segments to a base URL.
fn endpoint(base: &Url, segments: &[&str]) -> IdentityResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| IdentityError::InvalidUrl(format!("{} cannot be a base", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

impl IdentityService for HttpIdentityClient {
    fn get_user_info<'a>(&'a self, id_token: &'a str) -> IdentityFuture<'a, UserInfo> {
        Box::pin(async move {
            let mut url = self.auth_url(&["userinfo"])?;
            url.query_pairs_mut().append_pair("token", id_token);
            self.get_json(url).await
        })
    }

    fn get_credentials<'a>(&'a self, grant: &'a CredentialGrant) -> IdentityFuture<'a, Credentials> {
        Box::pin(async move {
            let mut url = self.auth_url(&["credentials"])?;
            match grant {
                CredentialGrant::TempCode(code) => {
                    url.query_pairs_mut()
                        .append_pair("code", code)
                        .append_pair("auth-flow", "tempCodeAuth");
                }
                CredentialGrant::RefreshToken(token) => {
                    url.query_pairs_mut()
                        .append_pair("auth-flow", "refreshTokenAuth")
                        .append_pair("refresh-token", token);
                }
            }
            self.get_json(url).await
        })
    }

    fn create_saas_user<'a>(&'a self, param: &'a CreateSaasUserParam) -> IdentityFuture<'a, SaasUser> {
        Box::pin(async move { self.post_json(self.auth_url(&["users"])?, param).await })
    }

    fn create_tenant<'a>(&'a self, param: &'a CreateTenantParam) -> IdentityFuture<'a, Tenant> {
        Box::pin(async move { self.post_json(self.auth_url(&["tenants"])?, param).await })
    }

    fn get_tenant<'a>(&'a self, tenant_id: &'a TenantId) -> IdentityFuture<'a, Tenant> {
        Box::pin(async move {
            self.get_json(self.auth_url(&["tenants", tenant_id.as_str()])?)
                .await
        })
    }

    fn list_tenant_users<'a>(&'a self, tenant_id: &'a TenantId) -> IdentityFuture<'a, Vec<TenantUser>> {
        Box::pin(async move {
            let url = self.auth_url(&["tenants", tenant_id.as_str(), "users"])?;
            let envelope: TenantUsersEnvelope = self.get_json(url).await?;
            Ok(envelope.users)
        })
    }

    fn create_tenant_user<'a>(
        &'a self,
        tenant_id: &'a TenantId,
        param: &'a CreateTenantUserParam,
    ) -> IdentityFuture<'a, TenantUser> {
        Box::pin(async move {
            let url = self.auth_url(&["tenants", tenant_id.as_str(), "users"])?;
            self.post_json(url, param).await
        })
    }

    fn get_tenant_user<'a>(
        &'a self,
        tenant_id: &'a TenantId,
        user_id: &'a UserId,
    ) -> IdentityFuture<'a, TenantUser> {
        Box::pin(async move {
            let url = self.auth_url(&["tenants", tenant_id.as_str(), "users", user_id.as_str()])?;
            self.get_json(url).await
        })
    }

    fn delete_tenant_user<'a>(
        &'a self,
        tenant_id: &'a TenantId,
        user_id: &'a UserId,
    ) -> IdentityFuture<'a, ()> {
        Box::pin(async move {
            let url = self.auth_url(&["tenants", tenant_id.as_str(), "users", user_id.as_str()])?;
            self.delete(url).await
        })
    }

    fn list_roles(&self) -> IdentityFuture<'_, Vec<Role>> {
        Box::pin(async move {
            let envelope: RolesEnvelope = self.get_json(self.auth_url(&["roles"])?).await?;
            Ok(envelope.roles)
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
            let env = env_id.to_string();
            let url = self.auth_url(&[
                "tenants",
                tenant_id.as_str(),
                "users",
                user_id.as_str(),
                "envs",
                &env,
                "roles",
            ])?;
            self.post_no_content(url, param).await
        })
    }

    fn list_tenant_attributes(&self) -> IdentityFuture<'_, Vec<AttributeDefinition>> {
        Box::pin(async move {
            let envelope: TenantAttributesEnvelope =
                self.get_json(self.auth_url(&["tenant-attributes"])?).await?;
            Ok(envelope.tenant_attributes)
        })
    }

    fn list_user_attributes(&self) -> IdentityFuture<'_, Vec<AttributeDefinition>> {
        Box::pin(async move {
            let envelope: UserAttributesEnvelope =
                self.get_json(self.auth_url(&["user-attributes"])?).await?;
            Ok(envelope.user_attributes)
        })
    }

    fn list_tenant_invitations<'a>(
        &'a self,
        tenant_id: &'a TenantId,
    ) -> IdentityFuture<'a, Vec<Invitation>> {
        Box::pin(async move {
            let url = self.auth_url(&["tenants", tenant_id.as_str(), "invitations"])?;
            let envelope: InvitationsEnvelope = self.get_json(url).await?;
            Ok(envelope.invitations)
        })
    }

    fn create_tenant_invitation<'a>(
        &'a self,
        tenant_id: &'a TenantId,
        param: &'a CreateTenantInvitationParam,
    ) -> IdentityFuture<'a, Invitation> {
        Box::pin(async move {
            let url = self.auth_url(&["tenants", tenant_id.as_str(), "invitations"])?;
            self.post_json(url, param).await
        })
    }

    fn get_pricing_plan<'a>(&'a self, plan_id: &'a PlanId) -> IdentityFuture<'a, Value> {
        Box::pin(async move {
            let url = endpoint(&self.pricing_base, &["plans", plan_id.as_str()])?;
            self.get_json(url).await
        })
    }
}
