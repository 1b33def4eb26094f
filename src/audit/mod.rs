//! Audit trail for destructive account operations.
//!
//! Every removal of a tenant membership leaves one immutable
//! [`DeletionLogRecord`]. The core only appends and queries; retention is
//! handled outside this crate.

mod store;

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Email, TenantId, UserId};

pub use store::SurrealAuditLogStore;

/// A deletion event as written by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionLogRecord {
    /// Surrogate identifier assigned by the store.
    pub id: String,
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub email: Email,
    /// When the membership was removed. Serialized as RFC 3339.
    pub delete_at: Option<DateTime<Utc>>,
}

/// Payload for appending a deletion event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDeletionLog {
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub email: Email,
    pub delete_at: DateTime<Utc>,
}

impl NewDeletionLog {
    /// Stamp a deletion with the current time.
    pub fn now(tenant_id: TenantId, user_id: UserId, email: Email) -> Self {
        Self {
            tenant_id,
            user_id,
            email,
            delete_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuditError {
    #[error("audit store error: {0}")]
    Database(String),
    #[error("audit store returned no record for the insert")]
    NotWritten,
    #[error("corrupt audit record {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

impl From<surrealdb::Error> for AuditError {
    fn from(err: surrealdb::Error) -> Self {
        Self::Database(err.to_string())
    }
}

pub type AuditResult<T> = Result<T, AuditError>;

/// Boxed future returned by [`AuditLogStore`] operations.
pub type AuditFuture<'a, T> = Pin<Box<dyn Future<Output = AuditResult<T>> + Send + 'a>>;

/// Append/query access to deletion records.
///
/// Each call is an independent insert or a single query scoped by tenant;
/// implementations must be safe to share across concurrent requests.
pub trait AuditLogStore: Send + Sync {
    /// Persist a deletion event and return it with its surrogate id.
    fn append<'a>(&'a self, entry: NewDeletionLog) -> AuditFuture<'a, DeletionLogRecord>;

    /// All deletion events for a tenant, oldest first.
    fn list_for_tenant<'a>(
        &'a self,
        tenant_id: &'a TenantId,
    ) -> AuditFuture<'a, Vec<DeletionLogRecord>>;
}
