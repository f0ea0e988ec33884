use anyhow::Result;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tokio::sync::OnceCell;

pub mod models;
pub mod repositories;
pub mod transaction;
pub mod utils;

static POOL: OnceCell<PgPool> = OnceCell::const_new();

pub async fn init_database(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    log::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    log::info!("Migrations completed successfully");

    POOL.set(pool.clone()).ok();

    Ok(pool)
}

/// Process-global pool used by the module-function repositories.
pub fn get_pool() -> PgPool {
    POOL.get()
        .expect("database pool accessed before init_database")
        .clone()
}

/// Install an already-built pool (tests set up their own database).
pub fn set_pool(pool: PgPool) {
    POOL.set(pool).ok();
}
