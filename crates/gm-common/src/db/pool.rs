use deadpool_postgres::{
    Config, CreatePoolError, ManagerConfig, Pool, PoolError, RecyclingMethod, Runtime,
};
use std::str::FromStr;
use thiserror::Error;
use tokio_postgres::NoTls;
use tracing::info;

pub type PgPool = Pool;

#[derive(Debug, Error)]
pub enum DbPoolError {
    #[error("invalid database url: {0}")]
    InvalidConfig(String),
    #[error("failed to create database pool: {0}")]
    PoolCreation(#[from] CreatePoolError),
    #[error("database unreachable: {0}")]
    Connect(#[from] PoolError),
    #[error("database health check failed: {0}")]
    HealthCheck(#[from] tokio_postgres::Error),
}

/// Build a pool without touching the network; connections open lazily.
pub fn create_pool_from_url(db_url: &str) -> Result<PgPool, DbPoolError> {
    tokio_postgres::Config::from_str(db_url)
        .map_err(|e| DbPoolError::InvalidConfig(e.to_string()))?;

    let mut cfg = Config::new();
    cfg.url = Some(db_url.to_string());
    cfg.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });

    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
        .map_err(DbPoolError::PoolCreation)
}

/// Like [`create_pool_from_url`], then round-trips `SELECT 1` so a bad
/// `DATABASE_URL` fails at startup instead of at the first sweep.
pub async fn create_pool_from_url_checked(db_url: &str) -> Result<PgPool, DbPoolError> {
    let pool = create_pool_from_url(db_url)?;
    let client = pool.get().await?;
    client.query_one("SELECT 1", &[]).await?;
    info!(max_size = pool.status().max_size, "database pool ready");
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_pool_without_connecting() {
        let result = create_pool_from_url("postgres://gm:gm@localhost:5432/gigmatch");
        assert!(result.is_ok());
    }

    #[test]
    fn rejects_malformed_url() {
        let err = create_pool_from_url("postgres://gm@localhost:notaport/db").unwrap_err();
        assert!(matches!(err, DbPoolError::InvalidConfig(_)));
    }
}
