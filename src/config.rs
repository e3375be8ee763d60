use anyhow::{bail, Context, Result};

/// Application configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // ── Server ──────────────────────────────────────────────────────────
    pub host: String,
    pub port: u16,
    /// Path prefix the token routes are nested under (e.g. `/oauth2-token`).
    pub mount_prefix: String,

    // ── Database ────────────────────────────────────────────────────────
    /// PostgreSQL connection string. Without it the in-memory store is used.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = lookup("PORT")
            .unwrap_or_else(|| "8430".into())
            .parse()
            .context("Invalid PORT")?;

        let database_max_connections: u32 = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".into())
            .parse()
            .context("Invalid DATABASE_MAX_CONNECTIONS")?;
        if database_max_connections == 0 {
            bail!("DATABASE_MAX_CONNECTIONS must be greater than zero");
        }

        let mount_prefix =
            normalize_prefix(&lookup("MOUNT_PREFIX").unwrap_or_else(|| "/oauth2-token".into()))?;

        Ok(Config {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            mount_prefix,
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            database_max_connections,
        })
    }
}

fn normalize_prefix(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !trimmed.starts_with('/') {
        bail!("MOUNT_PREFIX must start with '/', got {raw:?}");
    }
    Ok(trimmed.to_string())
}
