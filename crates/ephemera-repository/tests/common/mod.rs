//! Common test infrastructure for database integration tests.

use ephemera_config::DatabaseConfig;
use ephemera_repository::{DatabasePool, DatabasePoolInterface};
use std::sync::Arc;

/// Test database wrapper.
///
/// Holds a single-connection in-memory SQLite pool so every query sees the
/// same database.
pub struct TestDatabase {
    pool: Arc<DatabasePool>,
}

impl TestDatabase {
    /// Creates a fresh database and runs migrations.
    pub async fn new() -> Self {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            min_connections: 1,
            max_connections: 1,
            connect_timeout_secs: 5,
            idle_timeout_secs: 3600,
            run_migrations: true,
        };

        let pool = DatabasePool::new(&config)
            .await
            .expect("Failed to open in-memory database");

        pool.run_migrations()
            .await
            .expect("Failed to run migrations");

        Self {
            pool: Arc::new(pool),
        }
    }

    /// Returns a reference to the database pool.
    pub fn pool(&self) -> Arc<DatabasePool> {
        Arc::clone(&self.pool)
    }
}
