use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Lazily created process-wide connection pool.
pub struct Database;

impl Database {
    fn cell() -> &'static tokio::sync::OnceCell<PgPool> {
        static POOL: tokio::sync::OnceCell<PgPool> = tokio::sync::OnceCell::const_new();
        &POOL
    }

    pub async fn pool() -> Result<PgPool, DbError> {
        let pool = Self::cell()
            .get_or_try_init(|| async {
                let url = std::env::var("DATABASE_URL")
                    .map_err(|_| DbError::ConfigMissing("DATABASE_URL"))?;
                url::Url::parse(&url).map_err(|_| DbError::InvalidDatabaseUrl)?;

                let cfg = &config::config().database;
                let pool = PgPoolOptions::new()
                    .max_connections(cfg.max_connections)
                    .acquire_timeout(Duration::from_secs(cfg.connection_timeout_secs))
                    .connect(&url)
                    .await?;

                info!("created database pool (max_connections={})", cfg.max_connections);
                Ok::<_, DbError>(pool)
            })
            .await?;
        Ok(pool.clone())
    }

    /// Applies embedded migrations. Invoked at startup in environments that
    /// opt in, and always by `trackctl init`.
    pub async fn migrate() -> Result<(), DbError> {
        let pool = Self::pool().await?;
        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| DbError::Migration(e.to_string()))?;
        info!("database migrations up to date");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check() -> Result<(), DbError> {
        let pool = Self::pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }
}
