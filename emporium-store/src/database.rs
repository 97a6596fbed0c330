use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use tracing::info;

use crate::app_config::DatabaseConfig;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(connection_string: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(connection_string)
            .await?;

        Ok(Self { pool })
    }

    /// Connect using the `[database]` section; `None` when no url is configured.
    pub async fn from_config(config: &DatabaseConfig) -> Result<Option<Self>, sqlx::Error> {
        let Some(url) = config.url.as_deref() else {
            return Ok(None);
        };
        let client = Self::new(url, config.max_connections).await?;
        if config.run_migrations {
            client.migrate().await?;
        }
        Ok(Some(client))
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&self.pool)
            .await?;
        info!("Migrations completed successfully.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    const ORDERS_SCHEMA: &str = include_str!("../../migrations/20240101000001_orders.sql");
    const CATALOG_SCHEMA: &str = include_str!("../../migrations/20240101000000_catalog.sql");

    #[test]
    fn test_money_columns_keep_full_scale() {
        for schema in [ORDERS_SCHEMA, CATALOG_SCHEMA] {
            assert!(schema.contains("NUMERIC"));
            assert!(!schema.contains("NUMERIC("), "money columns must not round");
        }
    }
}
