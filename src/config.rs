use std::env;
use std::time::Duration;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub db_query_timeout: Duration,
    pub run_migrations: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None => database_url_from_parts(&lookup)?,
        };
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| "127.0.0.1:5000".to_string());

        let db_max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", 10u32)?;
        let db_acquire_timeout = Duration::from_secs(parse_or(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", 5u64)?);
        let db_query_timeout = Duration::from_secs(parse_or(&lookup, "DB_QUERY_TIMEOUT_SECS", 10u64)?);
        let run_migrations = parse_or(&lookup, "RUN_MIGRATIONS", true)?;

        if db_max_connections == 0 {
            anyhow::bail!("DB_MAX_CONNECTIONS must be at least 1");
        }

        Ok(Self {
            database_url,
            bind_addr,
            db_max_connections,
            db_acquire_timeout,
            db_query_timeout,
            run_migrations,
        })
    }
}

/// Builds a postgres URL from the discrete DB_* variables.
fn database_url_from_parts(lookup: &impl Fn(&str) -> Option<String>) -> anyhow::Result<String> {
    let host = lookup("DB_HOST").unwrap_or_else(|| "localhost".to_string());
    let port: u16 = parse_or(lookup, "DB_PORT", 5432u16)?;
    let name = lookup("DB_NAME").unwrap_or_else(|| "clinica".to_string());
    let user = lookup("DB_USER").unwrap_or_else(|| "clinica_user".to_string());
    let password = lookup("DB_PASSWORD")
        .context("either DATABASE_URL or DB_PASSWORD must be set")?;

    Ok(format!("postgres://{user}:{password}@{host}:{port}/{name}"))
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("invalid {key}={raw:?}: {e}")),
    }
}
