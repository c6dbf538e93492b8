use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub mod dto;
pub mod error;
pub mod memory;
pub mod models;
pub mod repository;
pub mod store;

pub use memory::MemoryStore;
pub use store::{DisplayNameStore, ImageQueueStore, LeaderboardStore};

use error::Result;

/// Handle to the PostgreSQL database backing the bot.
///
/// Cloning is cheap; all clones share the same connection pool.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}
