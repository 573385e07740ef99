use std::time::Duration;

use anyhow::Result;
use sea_orm::{DatabaseConnection, SqlxPostgresConnector};
use sea_orm_migration::MigratorTrait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::migration::Migrator;

pub type DbPool = PgPool;

/// Build the Postgres pool shared by every request.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Wrap an existing pool in a SeaORM connection.
pub fn create_orm_conn(pool: DbPool) -> DatabaseConnection {
    SqlxPostgresConnector::from_sqlx_postgres_pool(pool)
}

/// Apply every pending schema migration.
pub async fn run_migrations(conn: &DatabaseConnection) -> Result<()> {
    Migrator::up(conn, None).await?;
    Ok(())
}
