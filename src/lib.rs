// Core modules
pub mod attributes;
pub mod audit;
pub mod auth;
pub mod config;
pub mod db;
pub mod identity;
pub mod types;

// Orchestration and HTTP surface
pub mod api;
pub mod workflows;

// Re-export key types and functions
pub use audit::{AuditLogStore, DeletionLogRecord, SurrealAuditLogStore};
pub use auth::{IdentityContext, TenantMembershipGuard};
pub use config::{GatewayConfig, load_gateway_config};
pub use db::{DatabaseConfig, create_connection, ensure_schema};
pub use identity::{HttpIdentityClient, IdentityService};
pub use workflows::{WorkflowError, Workflows};

use std::sync::Arc;

use anyhow::Result;
use axum::Router;

/// Convenience function to create the fully wired HTTP application.
///
/// Connects to the audit database, applies its schema, builds the signed
/// identity client and returns the router with all routes mounted.
pub async fn build_app(config: &GatewayConfig, db_config: DatabaseConfig) -> Result<Router> {
    let db = create_connection(db_config).await?;
    ensure_schema(&db).await?;

    let identity = Arc::new(HttpIdentityClient::new(&config.identity)?);
    let audit = Arc::new(SurrealAuditLogStore::new(db));
    let workflows = Workflows::new(identity, audit, config.environments);

    let state = api::AppState::new(workflows, &config.http);
    api::create_router(state, &config.http)
}
