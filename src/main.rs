//! Coderr marketplace backend
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────┐    ┌─────────────┐
//! │  Config  │───▶│ Gateway  │───▶│ Services │───▶│ MarketStore │
//! │  (YAML)  │    │  (axum)  │    │ (+authz) │    │ (PG / mem)  │
//! └──────────┘    └──────────┘    └──────────┘    └─────────────┘
//! ```
//!
//! Usage: `coderr [--env dev] [--port 8080] [--create-admin <username> <email>]`
//! (`--create-admin` reads the password from `ADMIN_PASSWORD`).

use std::sync::Arc;

use anyhow::{Context, Result};

use coderr::config::AppConfig;
use coderr::db::Database;
use coderr::gateway::{self, state::AppState};
use coderr::models::UserRole;
use coderr::store::{MarketStore, MemoryStore, NewUser, PgStore, StoreError};
use coderr::user_auth::service::hash_password;

/// Command line flags; everything else comes from `config/{env}.yaml`
#[derive(Debug, Default, PartialEq, Eq)]
struct CliArgs {
    env: Option<String>,
    port: Option<u16>,
    create_admin: Option<(String, String)>,
}

impl CliArgs {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut parsed = Self::default();
        let mut args = args.into_iter().skip(1);
        while let Some(flag) = args.next() {
            let mut value = |name: &str| {
                args.next()
                    .with_context(|| format!("{} expects a value", name))
            };
            match flag.as_str() {
                "--env" | "-e" => parsed.env = Some(value("--env")?),
                "--port" => {
                    let raw = value("--port")?;
                    parsed.port = Some(
                        raw.parse()
                            .with_context(|| format!("invalid --port value: {}", raw))?,
                    );
                }
                "--create-admin" => {
                    let username = value("--create-admin")?;
                    let email = value("--create-admin")?;
                    parsed.create_admin = Some((username, email));
                }
                other => anyhow::bail!("unknown argument: {}", other),
            }
        }
        Ok(parsed)
    }

    fn env(&self) -> &str {
        self.env.as_deref().unwrap_or("dev")
    }
}

async fn open_store(config: &AppConfig) -> Result<(Arc<dyn MarketStore>, Option<Arc<Database>>)> {
    match &config.postgres_url {
        Some(url) => {
            let db = Database::connect(url)
                .await
                .context("Failed to connect to PostgreSQL")?;
            db.migrate().await.context("Schema bootstrap failed")?;
            let store: Arc<dyn MarketStore> = Arc::new(PgStore::new(db.pool().clone()));
            Ok((store, Some(Arc::new(db))))
        }
        None => {
            tracing::warn!("postgres_url not set, using the in-memory store (data is not persisted)");
            Ok((Arc::new(MemoryStore::new()), None))
        }
    }
}

async fn create_admin(store: &dyn MarketStore, username: String, email: String) -> Result<()> {
    let password = std::env::var("ADMIN_PASSWORD")
        .context("ADMIN_PASSWORD must be set to create an admin account")?;
    anyhow::ensure!(password.len() >= 8, "ADMIN_PASSWORD must be at least 8 characters");
    let password_hash = hash_password(&password)?;

    match store
        .create_user(NewUser {
            username: username.clone(),
            email,
            password_hash,
            role: UserRole::Customer,
            is_admin: true,
        })
        .await
    {
        Ok(user) => {
            tracing::info!(user_id = user.id, username = %user.username, "admin account created");
            Ok(())
        }
        Err(StoreError::Conflict(key)) => {
            tracing::warn!(username = %username, key, "admin account not created, already exists");
            Ok(())
        }
        Err(e) => Err(e).context("Failed to create admin account"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse(std::env::args())?;
    let app_config = AppConfig::load(args.env())?;
    let _log_guard = coderr::logging::init_logging(&app_config);

    tracing::info!("Starting Coderr backend in {} mode", args.env());

    let (store, pg_db) = open_store(&app_config).await?;

    if let Some((username, email)) = args.create_admin {
        create_admin(store.as_ref(), username, email).await?;
    }

    let port = args.port.unwrap_or(app_config.gateway.port);
    let state = Arc::new(AppState::new(store, &app_config, pg_db));

    gateway::run_server(&app_config.gateway.host, port, state).await
}
