//! Session credential pass-throughs and the refresh-token cookie.

use axum::{
    Json,
    extract::{Query, State},
    http::{
        HeaderMap, HeaderValue,
        header::{COOKIE, SET_COOKIE},
    },
    response::{AppendHeaders, IntoResponse},
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::api::{ApiError, AppState};
use crate::identity::CredentialGrant;
use crate::workflows::WorkflowError;

pub const REFRESH_COOKIE_NAME: &str = "SaaSusRefreshToken";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CodeQuery {
    pub code: Option<String>,
}

/// `Set-Cookie` value carrying the refresh token.
pub fn refresh_cookie(token: &str, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax{}",
        REFRESH_COOKIE_NAME, token, secure
    )
}

/// `Set-Cookie` value that expires the refresh token.
pub fn clear_refresh_cookie(secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!(
        "{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax{}",
        REFRESH_COOKIE_NAME, secure
    )
}

/// Extract a cookie value from the `Cookie` header.
pub fn extract_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get(COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .find_map(|cookie| {
            let (name, value) = cookie.trim().split_once('=')?;
            (name == cookie_name && !value.is_empty()).then(|| value.to_string())
        })
}

fn set_cookie(value: String) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(&value)
        .map_err(|_| ApiError::validation("Refresh token contains invalid characters"))
}

/// Exchange the hosted login callback code for credentials.
pub async fn credentials(
    State(state): State<AppState>,
    Query(query): Query<CodeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let code = query
        .code
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ApiError::validation("Code not found"))?;

    let credentials = state
        .workflows
        .identity()
        .get_credentials(&CredentialGrant::TempCode(code))
        .await
        .map_err(WorkflowError::from)?;

    let mut cookies = Vec::new();
    if let Some(token) = credentials.refresh_token.as_deref() {
        cookies.push((SET_COOKIE, set_cookie(refresh_cookie(token, state.secure_cookies))?));
    }

    info!("Issued session credentials");
    Ok((AppendHeaders(cookies), Json(credentials)))
}

/// Exchange the refresh-token cookie for fresh credentials.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = extract_cookie(&headers, REFRESH_COOKIE_NAME)
        .ok_or_else(|| ApiError::validation("Refresh token not found"))?;

    let credentials = state
        .workflows
        .identity()
        .get_credentials(&CredentialGrant::RefreshToken(token))
        .await
        .map_err(WorkflowError::from)?;

    Ok(Json(credentials))
}

pub async fn logout(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let cookie = set_cookie(clear_refresh_cookie(state.secure_cookies))?;
    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(json!({ "message": "Logged out" })),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; SaaSusRefreshToken=abc123 ; other=1"),
        );
        assert_eq!(
            extract_cookie(&headers, REFRESH_COOKIE_NAME),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn test_missing_or_empty_cookie() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_cookie(&headers, REFRESH_COOKIE_NAME), None);

        headers.insert(COOKIE, HeaderValue::from_static("SaaSusRefreshToken="));
        assert_eq!(extract_cookie(&headers, REFRESH_COOKIE_NAME), None);
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = refresh_cookie("tok", true);
        assert!(cookie.starts_with("SaaSusRefreshToken=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.ends_with("; Secure"));

        assert!(!refresh_cookie("tok", false).contains("Secure"));
        assert!(clear_refresh_cookie(false).contains("Max-Age=0"));
    }
}
