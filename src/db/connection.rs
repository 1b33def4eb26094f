use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use surrealdb::engine::any::Any;
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;

pub type Db = Surreal<Any>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: env::var("GATEWAY_DB_URL")
                .unwrap_or_else(|_| "memory".to_string()),
            namespace: env::var("GATEWAY_DB_NAMESPACE")
                .unwrap_or_else(|_| "gateway".to_string()),
            database: env::var("GATEWAY_DB_DATABASE")
                .unwrap_or_else(|_| "audit".to_string()),
            username: env::var("GATEWAY_DB_USERNAME").ok(),
            password: env::var("GATEWAY_DB_PASSWORD").ok(),
        }
    }
}

pub async fn create_connection(config: DatabaseConfig) -> Result<Db> {
    let db = surrealdb::engine::any::connect(config.url).await?;

    // Sign in if credentials are provided
    if let (Some(username), Some(password)) = (config.username, config.password) {
        db.signin(Root {
            username: &username,
            password: &password,
        })
        .await?;
    }

    db.use_ns(config.namespace).use_db(config.database).await?;

    Ok(db)
}

pub async fn ensure_schema(db: &Db) -> Result<()> {
    let schema_queries = vec![
        // One immutable row per removed tenant membership.
        // delete_at holds a fixed-width RFC 3339 UTC string so it sorts chronologically.
        "DEFINE TABLE IF NOT EXISTS delete_user_log SCHEMAFULL;
         DEFINE FIELD IF NOT EXISTS log_id ON TABLE delete_user_log TYPE string;
         DEFINE FIELD IF NOT EXISTS tenant_id ON TABLE delete_user_log TYPE string;
         DEFINE FIELD IF NOT EXISTS user_id ON TABLE delete_user_log TYPE string;
         DEFINE FIELD IF NOT EXISTS email ON TABLE delete_user_log TYPE string;
         DEFINE FIELD IF NOT EXISTS delete_at ON TABLE delete_user_log TYPE string;",

        "DEFINE INDEX IF NOT EXISTS delete_user_log_tenant ON TABLE delete_user_log COLUMNS tenant_id;",
    ];

    for query in schema_queries {
        db.query(query).await?.check()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_connection_and_schema() {
        let config = DatabaseConfig {
            url: "memory".to_string(),
            ..Default::default()
        };
        let db = create_connection(config).await.unwrap();
        ensure_schema(&db).await.unwrap();

        // Applying the schema twice is harmless.
        ensure_schema(&db).await.unwrap();
    }
}
