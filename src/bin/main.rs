use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;
use tenant_gateway::types::TenantId;
use tenant_gateway::{
    AuditLogStore, DatabaseConfig, SurrealAuditLogStore, build_app, load_gateway_config,
};

#[derive(Parser)]
#[command(name = "tenant-gateway")]
#[command(about = "Tenant-scoped gateway in front of the SaaS identity service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway HTTP server
    Serve {
        #[arg(short, long, env = "GATEWAY_PORT", default_value = "8080")]
        port: u16,
        #[arg(long, env = "GATEWAY_DB_URL", default_value = "memory")]
        db_url: String,
    },
    /// Initialize the audit database
    Init {
        #[arg(long, env = "GATEWAY_DB_URL", default_value = "memory")]
        db_url: String,
    },
    /// Print the user deletion log of a tenant
    DeleteLog {
        #[arg(long)]
        tenant_id: String,
        #[arg(long, env = "GATEWAY_DB_URL", default_value = "memory")]
        db_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("tenant_gateway=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .with_max_level(Level::INFO)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, db_url } => {
            let config = load_gateway_config()?;
            info!(
                api_base = %config.identity.api_base,
                cors_origin = %config.http.cors_origin,
                role_env_id = config.environments.role_env_id,
                invitation_env_id = config.environments.invitation_env_id,
                "Loaded gateway configuration"
            );

            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            info!("Using database url for audit log: {}", db_config.url);

            let app = build_app(&config, db_config).await?;

            let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
            info!("Gateway listening on http://0.0.0.0:{}", port);

            axum::serve(listener, app).await?;
        }
        Commands::Init { db_url } => {
            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            info!("Using database url for initialization: {}", db_config.url);

            info!("Initializing database...");
            let db = tenant_gateway::create_connection(db_config).await?;
            tenant_gateway::ensure_schema(&db).await?;
            info!("Database initialized successfully");
        }
        Commands::DeleteLog { tenant_id, db_url } => {
            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            let db = tenant_gateway::create_connection(db_config).await?;
            tenant_gateway::ensure_schema(&db).await?;

            let store = SurrealAuditLogStore::new(db);
            let logs = store.list_for_tenant(&TenantId::new(tenant_id)).await?;

            if logs.is_empty() {
                println!("No deletions recorded.");
                return Ok(());
            }

            println!(
                "{:<34} {:<38} {:<32} {:<32}",
                "ID", "USER", "EMAIL", "DELETED AT"
            );
            println!("{}", "-".repeat(136));

            for log in logs {
                let deleted = log
                    .delete_at
                    .map(|dt| dt.to_rfc3339())
                    .unwrap_or_else(|| "-".to_string());

                println!(
                    "{:<34} {:<38} {:<32} {:<32}",
                    log.id, log.user_id, log.email, deleted
                );
            }
        }
    }

    Ok(())
}
