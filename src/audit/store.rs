//! SurrealDB-backed deletion log.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::audit::{
    AuditError, AuditFuture, AuditLogStore, AuditResult, DeletionLogRecord, NewDeletionLog,
};
use crate::db::Db;
use crate::types::{Email, TenantId, UserId};

/// Row shape of the `delete_user_log` table.
#[derive(Debug, Deserialize)]
struct DeletionLogRow {
    log_id: String,
    tenant_id: String,
    user_id: String,
    email: String,
    delete_at: Option<String>,
}

impl TryFrom<DeletionLogRow> for DeletionLogRecord {
    type Error = AuditError;

    fn try_from(row: DeletionLogRow) -> Result<Self, Self::Error> {
        let delete_at = row
            .delete_at
            .as_deref()
            .map(DateTime::parse_from_rfc3339)
            .transpose()
            .map_err(|e| AuditError::Corrupt {
                id: row.log_id.clone(),
                reason: e.to_string(),
            })?
            .map(|dt| dt.with_timezone(&Utc));

        Ok(Self {
            id: row.log_id,
            tenant_id: TenantId::new(row.tenant_id),
            user_id: UserId::new(row.user_id),
            email: Email::new(row.email),
            delete_at,
        })
    }
}

/// Deletion log stored in the `delete_user_log` table.
#[derive(Clone)]
pub struct SurrealAuditLogStore {
    db: Db,
}

impl SurrealAuditLogStore {
    /// Create a store over an initialized connection (see [`crate::db::ensure_schema`]).
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    async fn insert(&self, entry: NewDeletionLog) -> AuditResult<DeletionLogRecord> {
        let log_id = Uuid::new_v4().simple().to_string();
        let delete_at = entry
            .delete_at
            .to_rfc3339_opts(SecondsFormat::Nanos, true);

        let query = r#"
            CREATE type::thing('delete_user_log', $log_id) CONTENT {
                log_id: $log_id,
                tenant_id: $tenant_id,
                user_id: $user_id,
                email: $email,
                delete_at: $delete_at
            }
        "#;

        let mut res = self
            .db
            .query(query)
            .bind(("log_id", log_id.clone()))
            .bind(("tenant_id", entry.tenant_id.into_inner()))
            .bind(("user_id", entry.user_id.into_inner()))
            .bind(("email", entry.email.into_inner()))
            .bind(("delete_at", delete_at))
            .await?
            .check()?;

        let rows: Vec<DeletionLogRow> = res.take(0)?;
        let row = rows.into_iter().next().ok_or(AuditError::NotWritten)?;

        debug!(log_id = %log_id, tenant_id = %row.tenant_id, "Deletion log written");
        row.try_into()
    }

    async fn select_for_tenant(&self, tenant_id: &TenantId) -> AuditResult<Vec<DeletionLogRecord>> {
        let query = r#"
            SELECT log_id, tenant_id, user_id, email, delete_at
            FROM delete_user_log
            WHERE tenant_id = $tenant_id
            ORDER BY delete_at ASC
        "#;

        let mut res = self
            .db
            .query(query)
            .bind(("tenant_id", tenant_id.to_string()))
            .await?
            .check()?;

        let rows: Vec<DeletionLogRow> = res.take(0)?;
        rows.into_iter().map(DeletionLogRecord::try_from).collect()
    }
}

impl AuditLogStore for SurrealAuditLogStore {
    fn append<'a>(&'a self, entry: NewDeletionLog) -> AuditFuture<'a, DeletionLogRecord> {
        Box::pin(self.insert(entry))
    }

    fn list_for_tenant<'a>(
        &'a self,
        tenant_id: &'a TenantId,
    ) -> AuditFuture<'a, Vec<DeletionLogRecord>> {
        Box::pin(self.select_for_tenant(tenant_id))
    }
}
