use anyhow::{Context, Result};
use deadpool_postgres::{
    Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime, Timeouts,
};
use std::time::Duration;
use tokio_postgres::NoTls;
use tracing::{debug, info, warn};

use crate::postgres::PostgresConfig;

const SCHEMA_SQL: &str = include_str!("../../migrations/postgres/0001_create_locations.sql");

/// PostgreSQL client wrapper with connection pooling
#[derive(Clone)]
pub struct PostgresClient {
    pool: Pool,
    operation_timeout: Duration,
}

impl PostgresClient {
    /// Creates a new PostgreSQL client with connection pooling
    ///
    /// The pool is lazy: no connection is opened until the first checkout.
    /// Checkout, connect and recycle waits are bounded by `operation_timeout`.
    pub fn new(config: &PostgresConfig) -> Result<Self> {
        let operation_timeout = Duration::from_secs(config.operation_timeout_secs);

        let mut cfg = Config::new();
        cfg.url = Some(config.url.clone());
        cfg.dbname = Some(config.database.clone());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let mut pool_cfg = PoolConfig::new(config.max_pool_size);
        pool_cfg.timeouts = Timeouts {
            wait: Some(operation_timeout),
            create: Some(operation_timeout),
            recycle: Some(operation_timeout),
        };
        cfg.pool = Some(pool_cfg);

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .context("failed to create postgres pool")?;

        Ok(Self {
            pool,
            operation_timeout,
        })
    }

    /// Pings the database to verify connectivity
    pub async fn ping(&self) -> Result<()> {
        let client = self.pool.get().await?;
        client.execute("SELECT 1", &[]).await?;
        debug!("postgreSQL connection successful");
        Ok(())
    }

    /// Pings until the database answers, doubling the wait after each failed attempt
    pub async fn connect_with_retry(
        &self,
        max_attempts: u32,
        initial_backoff: Duration,
    ) -> Result<()> {
        let max_attempts = max_attempts.max(1);
        let mut backoff = initial_backoff;
        let mut attempt = 1;

        loop {
            match self.ping().await {
                Ok(()) => {
                    info!(attempt, "connected to postgres");
                    return Ok(());
                }
                Err(e) if attempt < max_attempts => {
                    warn!(
                        attempt,
                        max_attempts,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "postgres not reachable, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(e.context(format!(
                        "postgres unreachable after {} attempts",
                        attempt
                    )));
                }
            }
        }
    }

    /// Creates the `locations` table if it does not exist yet
    pub async fn ensure_schema(&self) -> Result<()> {
        let client = self.get_connection().await?;
        client
            .batch_execute(SCHEMA_SQL)
            .await
            .context("failed to apply postgres schema")?;
        debug!("postgres schema ensured");
        Ok(())
    }

    /// Gets a connection from the pool
    pub async fn get_connection(&self) -> Result<deadpool_postgres::Client> {
        Ok(self.pool.get().await?)
    }

    /// Upper bound for a single store operation
    pub fn operation_timeout(&self) -> Duration {
        self.operation_timeout
    }
}
