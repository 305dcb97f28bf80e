//! Database module providing PostgreSQL connection pooling and the storage backends.
//!
//! Managers talk to storage through the [`Repository`] traits. Two backends
//! implement them: [`PgRepository`] for production and [`MemoryRepository`]
//! for tests and local runs.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

pub mod config;
pub mod memory;
pub mod postgres;
pub mod repository;
pub mod timeouts;

pub use config::DatabaseConfig;
pub use memory::MemoryRepository;
pub use postgres::PgRepository;
pub use repository::{
    AccountRepository, EventRepository, Repository, TeamRepository, TournamentRepository,
};

/// Database connection pool wrapper
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use matchday::db::{Database, DatabaseConfig};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), sqlx::Error> {
    ///     let config = DatabaseConfig::from_env();
    ///     let db = Database::new(&config).await?;
    ///     db.migrate().await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect(&config.database_url)
            .await?;

        log::info!(
            "Connected to database (max_connections={})",
            config.max_connections
        );
        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply pending schema migrations
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Check if the database connection is healthy
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Build a repository sharing this pool
    pub fn repository(&self) -> PgRepository {
        PgRepository::new(std::sync::Arc::new(self.pool.clone()))
    }

    /// Close the database connection pool
    pub async fn close(self) {
        self.pool.close().await;
    }
}
