// REST API endpoints for the gateway

mod error;
mod handlers;
mod session;

use axum::{
    Router,
    extract::{Request, State},
    http::{
        HeaderName, HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::AuthExtractor;
use crate::config::HttpConfig;
use crate::workflows::Workflows;

pub use error::ApiError;
pub use handlers::{ACCESS_TOKEN_HEADER, Caller};
pub use session::REFRESH_COOKIE_NAME;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    workflows: Workflows,
    auth: AuthExtractor,
    secure_cookies: bool,
}

impl AppState {
    pub fn new(workflows: Workflows, http: &HttpConfig) -> Self {
        let auth = AuthExtractor::new(workflows.identity().clone());
        Self {
            workflows,
            auth,
            secure_cookies: http.secure_cookies,
        }
    }
}

pub fn create_router(state: AppState, http: &HttpConfig) -> anyhow::Result<Router> {
    let origin: HeaderValue = http
        .cors_origin
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid CORS origin `{}`: {}", http.cors_origin, e))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
            HeaderName::from_static(ACCESS_TOKEN_HEADER),
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]);

    let protected = Router::new()
        .route("/userinfo", get(handlers::userinfo))
        .route("/users", get(handlers::list_users))
        .route("/tenant_attributes", get(handlers::tenant_attributes))
        .route("/tenant_attributes_list", get(handlers::tenant_attributes_list))
        .route("/user_attributes", get(handlers::user_attributes))
        .route("/user_register", post(handlers::user_register))
        .route("/user_delete", delete(handlers::user_delete))
        .route("/delete_user_log", get(handlers::delete_user_log))
        .route("/pricing_plan", get(handlers::pricing_plan))
        .route("/self_sign_up", post(handlers::self_sign_up))
        .route("/invitations", get(handlers::invitations))
        .route("/user_invitation", post(handlers::user_invitation))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_identity,
        ));

    let public = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/credentials", get(session::credentials))
        .route("/refresh", get(session::refresh))
        .route("/logout", post(session::logout));

    Ok(public
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state))
}

/// Resolve the bearer ID token into an [`IdentityContext`](crate::auth::IdentityContext)
/// and attach it to the request.
async fn require_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let context = state.auth.extract_user(authorization.as_deref()).await?;
    request.extensions_mut().insert(context);

    Ok(next.run(request).await)
}
