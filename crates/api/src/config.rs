//! Process configuration read from the environment.

use std::net::SocketAddr;

use anyhow::{Context, anyhow, bail};
use chrono::Duration;

use roomshare_auth::{default_session_ttl, parse_expiry};
use roomshare_observability::LogFormat;

pub const DEFAULT_JWT_SECRET: &str = "dev-secret";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

/// Which store implementations back the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    InMemory,
    Postgres { database_url: String },
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub jwt_secret: String,
    pub session_ttl: Duration,
    pub bind_addr: SocketAddr,
    pub log_format: LogFormat,
    pub storage: StorageConfig,
}

impl ApiConfig {
    /// In-memory configuration with the given signing secret and defaults
    /// for everything else.
    pub fn in_memory(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            session_ttl: default_session_ttl(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            log_format: LogFormat::Json,
            storage: StorageConfig::InMemory,
        }
    }

    /// Whether tokens are signed with the built-in development secret.
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string());

        let session_ttl = match lookup("JWT_EXPIRE") {
            Some(raw) => parse_expiry(&raw)
                .ok_or_else(|| anyhow!("JWT_EXPIRE must look like 7d, 12h, 30m, 45s or a number of seconds, got '{raw}'"))?,
            None => default_session_ttl(),
        };

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR must be a socket address such as 0.0.0.0:5000")?;

        let log_format = match lookup("LOG_FORMAT") {
            Some(raw) => raw.parse::<LogFormat>().map_err(|e| anyhow!(e))?,
            None => LogFormat::Json,
        };

        let persistent = match lookup("USE_PERSISTENT_STORES") {
            Some(raw) => parse_flag(&raw).with_context(|| format!("USE_PERSISTENT_STORES: invalid value '{raw}'"))?,
            None => false,
        };
        let storage = if persistent {
            let Some(database_url) = lookup("DATABASE_URL").filter(|s| !s.is_empty()) else {
                bail!("DATABASE_URL is required when USE_PERSISTENT_STORES is enabled");
            };
            StorageConfig::Postgres { database_url }
        } else {
            StorageConfig::InMemory
        };

        Ok(Self {
            jwt_secret,
            session_ttl,
            bind_addr,
            log_format,
            storage,
        })
    }
}

fn parse_flag(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => bail!("expected true or false"),
    }
}
