use anyhow::Context;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

/// Builds a connection pool against the PostgreSQL database at [db_url]
pub async fn connect_sqlx(db_url: &str) -> Result<PgPool, anyhow::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(2))
        .connect(db_url)
        .await
        .context("connecting to the todo database")
}

/// Applies the embedded schema migrations from the "migrations" directory
pub async fn migrate(pool: &PgPool) -> Result<(), anyhow::Error> {
    sqlx::migrate!()
        .run(pool)
        .await
        .context("running database migrations")
}
