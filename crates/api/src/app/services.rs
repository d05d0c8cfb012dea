//! Store and session wiring shared by every handler.

use std::sync::Arc;

use roomshare_auth::{Hs256SessionIssuer, SessionIssuer};
use roomshare_infra::{CredentialStore, InMemoryPropertyStore, InMemoryUserStore, PropertyStore, UserStore};

use crate::config::{ApiConfig, StorageConfig};

#[derive(Clone)]
pub struct AppServices {
    pub users: Arc<dyn UserStore>,
    pub properties: Arc<dyn PropertyStore>,
    pub credentials: CredentialStore,
    pub sessions: Arc<dyn SessionIssuer>,
}

impl AppServices {
    pub fn new(
        users: Arc<dyn UserStore>,
        properties: Arc<dyn PropertyStore>,
        sessions: Arc<dyn SessionIssuer>,
    ) -> Self {
        Self {
            credentials: CredentialStore::new(Arc::clone(&users)),
            users,
            properties,
            sessions,
        }
    }

    /// In-memory stores (dev/tests).
    pub fn in_memory(sessions: Arc<dyn SessionIssuer>) -> Self {
        Self::new(
            Arc::new(InMemoryUserStore::new()),
            Arc::new(InMemoryPropertyStore::new()),
            sessions,
        )
    }
}

/// Build services for `config`, connecting to Postgres when configured.
pub async fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    let sessions: Arc<dyn SessionIssuer> = Arc::new(Hs256SessionIssuer::new(
        config.jwt_secret.as_bytes(),
        config.session_ttl,
    ));

    match &config.storage {
        StorageConfig::InMemory => {
            tracing::info!("using in-memory stores");
            Ok(AppServices::in_memory(sessions))
        }
        StorageConfig::Postgres { database_url } => postgres_services(database_url, sessions).await,
    }
}

#[cfg(feature = "postgres")]
async fn postgres_services(database_url: &str, sessions: Arc<dyn SessionIssuer>) -> anyhow::Result<AppServices> {
    use anyhow::Context;
    use roomshare_infra::{PostgresPropertyStore, PostgresUserStore, ensure_schema};

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .context("failed to connect to DATABASE_URL")?;
    ensure_schema(&pool).await.context("failed to prepare database schema")?;
    tracing::info!("using Postgres stores");

    Ok(AppServices::new(
        Arc::new(PostgresUserStore::new(pool.clone())),
        Arc::new(PostgresPropertyStore::new(pool)),
        sessions,
    ))
}

#[cfg(not(feature = "postgres"))]
async fn postgres_services(_database_url: &str, _sessions: Arc<dyn SessionIssuer>) -> anyhow::Result<AppServices> {
    anyhow::bail!("USE_PERSISTENT_STORES requires building with the `postgres` feature")
}
