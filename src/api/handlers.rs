//! Thin adapters from HTTP requests onto workflows.

use axum::{
    Json,
    extract::{FromRequestParts, Query, State, rejection::JsonRejection},
    http::{HeaderMap, request::Parts},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::api::{ApiError, AppState};
use crate::attributes::AttributeDefinition;
use crate::audit::DeletionLogRecord;
use crate::auth::{GuardDenial, IdentityContext};
use crate::identity::{Invitation, TenantUser};
use crate::types::TenantId;
use crate::workflows::{
    InvitationRequest, SelfSignUp, TenantAttributeProjection, UserDeletion, UserRegistration,
    WorkflowError,
};

pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

/// The caller resolved by the authentication middleware.
pub struct Caller(pub IdentityContext);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<IdentityContext>()
            .cloned()
            .map(Caller)
            .ok_or(ApiError::Workflow(WorkflowError::Authorization(
                GuardDenial::NoUser,
            )))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TenantQuery {
    pub tenant_id: Option<String>,
}

impl TenantQuery {
    fn tenant_id(self) -> Result<TenantId, ApiError> {
        self.tenant_id
            .filter(|t| !t.trim().is_empty())
            .map(TenantId::new)
            .ok_or_else(|| ApiError::validation("TenantId not found"))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PlanQuery {
    pub plan_id: Option<String>,
}

/// Unwrap a JSON body, reporting malformed input as a validation error.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::validation(rejection.body_text()))
}

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

pub async fn userinfo(Caller(context): Caller) -> Json<IdentityContext> {
    Json(context)
}

pub async fn list_users(
    State(state): State<AppState>,
    Caller(context): Caller,
    Query(query): Query<TenantQuery>,
) -> Result<Json<Vec<TenantUser>>, ApiError> {
    let tenant_id = query.tenant_id()?;
    let users = state.workflows.list_tenant_users(&context, &tenant_id).await?;
    Ok(Json(users))
}

pub async fn tenant_attributes(
    State(state): State<AppState>,
    Caller(context): Caller,
    Query(query): Query<TenantQuery>,
) -> Result<Json<TenantAttributeProjection>, ApiError> {
    let tenant_id = query.tenant_id()?;
    let projection = state
        .workflows
        .project_tenant_attributes(&context, &tenant_id)
        .await?;
    Ok(Json(projection))
}

pub async fn tenant_attributes_list(
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let definitions = state.workflows.tenant_attribute_definitions().await?;
    Ok(Json(json!({ "tenant_attributes": definitions })))
}

pub async fn user_attributes(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let definitions: Vec<AttributeDefinition> =
        state.workflows.user_attribute_definitions().await?;
    Ok(Json(json!({ "user_attributes": definitions })))
}

pub async fn user_register(
    State(state): State<AppState>,
    Caller(context): Caller,
    payload: Result<Json<UserRegistration>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = body(payload)?;
    state.workflows.register_user(&context, request).await?;
    Ok(Json(json!({ "message": "User registered successfully" })))
}

pub async fn user_delete(
    State(state): State<AppState>,
    Caller(context): Caller,
    payload: Result<Json<UserDeletion>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = body(payload)?;
    state.workflows.delete_user(&context, request).await?;
    Ok(Json(json!({ "message": "User delete successfully" })))
}

pub async fn delete_user_log(
    State(state): State<AppState>,
    Caller(context): Caller,
    Query(query): Query<TenantQuery>,
) -> Result<Json<Vec<DeletionLogRecord>>, ApiError> {
    let tenant_id = query.tenant_id()?;
    let logs = state.workflows.deletion_log(&context, &tenant_id).await?;
    Ok(Json(logs))
}

pub async fn pricing_plan(
    State(state): State<AppState>,
    Caller(context): Caller,
    Query(query): Query<PlanQuery>,
) -> Result<Json<Value>, ApiError> {
    let plan_id = query.plan_id.unwrap_or_default();
    let plan = state.workflows.pricing_plan(&context, &plan_id).await?;
    Ok(Json(plan))
}

pub async fn self_sign_up(
    State(state): State<AppState>,
    Caller(context): Caller,
    payload: Result<Json<SelfSignUp>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = body(payload)?;
    let tenant = state.workflows.self_sign_up(&context, request).await?;
    Ok(Json(json!({
        "message": "User registered successfully",
        "tenant_id": tenant.id,
    })))
}

pub async fn invitations(
    State(state): State<AppState>,
    Caller(context): Caller,
    Query(query): Query<TenantQuery>,
) -> Result<Json<Vec<Invitation>>, ApiError> {
    let tenant_id = query.tenant_id()?;
    let invitations = state.workflows.list_invitations(&context, &tenant_id).await?;
    Ok(Json(invitations))
}

pub async fn user_invitation(
    State(state): State<AppState>,
    Caller(context): Caller,
    headers: HeaderMap,
    payload: Result<Json<InvitationRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = body(payload)?;
    let access_token = headers
        .get(ACCESS_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());

    state
        .workflows
        .invite_user(&context, request, access_token)
        .await?;
    Ok(Json(json!({ "message": "Create tenant user invitation successfully" })))
}
