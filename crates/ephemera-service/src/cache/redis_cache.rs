//! Redis-based image cache.

use super::{cache_keys, ImageCache};
use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Pool, PoolConfig, Runtime, Timeouts};
use ephemera_config::RedisConfig;
use ephemera_core::{EphemeraError, EphemeraResult, ImageRecord};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Upper bound on a single Redis round trip.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(2);

/// Redis-backed image cache.
///
/// Records are stored as JSON under `{prefix}:{id}`. When an entry TTL is
/// configured Redis evicts entries on its own; the service never relies on it.
pub struct RedisImageCache {
    pool: Option<Arc<Pool>>,
    key_prefix: String,
    entry_ttl: Option<Duration>,
    operation_timeout: Duration,
}

impl RedisImageCache {
    /// Create a new Redis image cache.
    #[must_use]
    pub fn new(pool: Arc<Pool>, key_prefix: impl Into<String>, entry_ttl: Option<Duration>) -> Self {
        Self {
            pool: Some(pool),
            key_prefix: key_prefix.into(),
            entry_ttl,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Override the per-operation timeout.
    #[must_use]
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Create a no-op cache (for when Redis is disabled).
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            pool: None,
            key_prefix: cache_keys::DEFAULT_PREFIX.to_string(),
            entry_ttl: None,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    fn key(&self, id: &str) -> String {
        cache_keys::image_by_id(&self.key_prefix, id)
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> EphemeraResult<deadpool_redis::Connection> {
        match &self.pool {
            Some(pool) => pool.get().await.map_err(|e| {
                EphemeraError::cache(format!("Failed to get Redis connection: {}", e))
            }),
            None => Err(EphemeraError::cache("Cache is disabled")),
        }
    }

    /// Bound a Redis command so an unresponsive server surfaces as an error.
    async fn bounded<T, F>(&self, op: &str, key: &str, fut: F) -> EphemeraResult<T>
    where
        F: Future<Output = Result<T, deadpool_redis::redis::RedisError>> + Send,
    {
        match tokio::time::timeout(self.operation_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(EphemeraError::cache(format!(
                "Failed to {} key '{}': {}",
                op, key, e
            ))),
            Err(_) => Err(EphemeraError::cache(format!(
                "Timed out after {:?} trying to {} key '{}'",
                self.operation_timeout, op, key
            ))),
        }
    }
}

#[async_trait]
impl ImageCache for RedisImageCache {
    async fn get(&self, id: &str) -> EphemeraResult<Option<ImageRecord>> {
        if !self.is_enabled() {
            return Ok(None);
        }

        let key = self.key(id);
        let mut conn = self.get_conn().await?;
        let value: Option<String> = self.bounded("get", &key, conn.get(&key)).await?;

        match value {
            Some(json) => {
                debug!("Cache hit for key '{}'", key);
                let record = serde_json::from_str(&json).map_err(|e| {
                    EphemeraError::cache(format!("Corrupt cache entry '{}': {}", key, e))
                })?;
                Ok(Some(record))
            }
            None => {
                debug!("Cache miss for key '{}'", key);
                Ok(None)
            }
        }
    }

    async fn set(&self, id: &str, record: &ImageRecord) -> EphemeraResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let key = self.key(id);
        let json = serde_json::to_string(record)?;
        let mut conn = self.get_conn().await?;

        match self.entry_ttl {
            Some(ttl) => {
                let ttl_secs = ttl.as_secs().max(1);
                self.bounded::<(), _>("set", &key, conn.set_ex(&key, json, ttl_secs))
                    .await?;
                debug!("Cached key '{}' with TTL {}s", key, ttl_secs);
            }
            None => {
                self.bounded::<(), _>("set", &key, conn.set(&key, json)).await?;
                debug!("Cached key '{}' without TTL", key);
            }
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> EphemeraResult<bool> {
        if !self.is_enabled() {
            return Ok(false);
        }

        let key = self.key(id);
        let mut conn = self.get_conn().await?;
        let deleted: i64 = self.bounded("delete", &key, conn.del(&key)).await?;

        debug!("Deleted key '{}': {}", key, deleted > 0);
        Ok(deleted > 0)
    }

    fn is_enabled(&self) -> bool {
        self.pool.is_some()
    }

    fn backend(&self) -> &'static str {
        if self.is_enabled() {
            "redis"
        } else {
            "disabled"
        }
    }
}

/// Creates a Redis connection pool from configuration.
///
/// Connections are established lazily, so an unreachable server does not fail
/// here; it shows up as cache errors on first use.
pub fn create_redis_pool(config: &RedisConfig) -> EphemeraResult<Arc<Pool>> {
    let timeout = config.timeout();

    let mut timeouts = Timeouts::default();
    timeouts.wait = Some(timeout);
    timeouts.create = Some(timeout);
    timeouts.recycle = Some(timeout);

    let mut pool_config = PoolConfig::new(config.pool_size);
    pool_config.timeouts = timeouts;

    let mut redis_cfg = deadpool_redis::Config::from_url(&config.url);
    redis_cfg.pool = Some(pool_config);

    let pool = redis_cfg
        .create_pool(Some(Runtime::Tokio1))
        .map_err(|e| EphemeraError::Configuration(format!("Failed to create Redis pool: {}", e)))?;

    info!(pool_size = config.pool_size, "Redis pool created");
    Ok(Arc::new(pool))
}
