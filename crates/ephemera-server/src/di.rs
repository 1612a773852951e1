//! Object graph construction.
//!
//! Every collaborator of the image service is created here from
//! configuration and handed over at construction time. Tests swap in their
//! own clock, random source or cache through the builder.

use ephemera_config::{CacheBackend, CacheConfig, ImageConfig, RedisConfig};
use ephemera_core::{
    Clock, EphemeraError, EphemeraResult, KeyGenerator, RandomSource, SystemClock,
    ThreadRandomSource,
};
use ephemera_repository::{DatabasePool, DatabasePoolInterface, SqliteImageRepository};
use ephemera_service::{
    create_redis_pool, ImageCache, ImageService, ImageServiceImpl, ImageSettings, JpegCodec,
    MemoryImageCache, RedisImageCache,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Fully wired application components.
pub struct AppModule {
    db_pool: Arc<DatabasePool>,
    cache: Arc<dyn ImageCache>,
    image_service: Arc<dyn ImageService>,
}

impl AppModule {
    /// The image service.
    #[must_use]
    pub fn image_service(&self) -> Arc<dyn ImageService> {
        Arc::clone(&self.image_service)
    }

    /// The database pool backing the durable store.
    #[must_use]
    pub fn db_pool(&self) -> Arc<DatabasePool> {
        Arc::clone(&self.db_pool)
    }

    /// The fast cache tier.
    #[must_use]
    pub fn cache(&self) -> Arc<dyn ImageCache> {
        Arc::clone(&self.cache)
    }
}

impl std::fmt::Debug for AppModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppModule")
            .field("db_pool", &self.db_pool)
            .field("cache", &self.cache.backend())
            .finish_non_exhaustive()
    }
}

/// Builder for [`AppModule`].
#[derive(Default)]
pub struct AppModuleBuilder {
    db_pool: Option<Arc<DatabasePool>>,
    cache: Option<Arc<dyn ImageCache>>,
    clock: Option<Arc<dyn Clock>>,
    random_source: Option<Arc<dyn RandomSource>>,
    images: ImageConfig,
}

impl AppModuleBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the database pool (required).
    #[must_use]
    pub fn with_database_pool(mut self, pool: Arc<DatabasePool>) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Sets the cache tier; defaults to a disabled cache.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn ImageCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Sets the clock; defaults to the system clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Sets the key randomness; defaults to the thread-local RNG.
    #[must_use]
    pub fn with_random_source(mut self, source: Arc<dyn RandomSource>) -> Self {
        self.random_source = Some(source);
        self
    }

    /// Sets image lifetime, key length and JPEG quality.
    #[must_use]
    pub fn with_image_config(mut self, images: ImageConfig) -> Self {
        self.images = images;
        self
    }

    /// Wires the module.
    pub fn build(self) -> EphemeraResult<AppModule> {
        let db_pool = self
            .db_pool
            .ok_or_else(|| EphemeraError::Configuration("Database pool not provided".to_string()))?;
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(RedisImageCache::disabled()));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let random_source = self
            .random_source
            .unwrap_or_else(|| Arc::new(ThreadRandomSource));

        let pool: Arc<dyn DatabasePoolInterface> = db_pool.clone();
        let image_service = ImageServiceImpl::new(
            Arc::new(SqliteImageRepository::new(pool)),
            Arc::clone(&cache),
            Arc::new(JpegCodec::new(self.images.jpeg_quality)),
            clock,
            KeyGenerator::new(random_source),
            ImageSettings::from(&self.images),
        );

        info!(
            cache = cache.backend(),
            ttl_secs = self.images.ttl_secs,
            key_length = self.images.key_length,
            "Application module built"
        );

        Ok(AppModule {
            db_pool,
            cache,
            image_service: Arc::new(image_service),
        })
    }
}

/// Creates the cache tier selected by configuration.
pub fn create_cache(
    cache_config: &CacheConfig,
    redis_config: &RedisConfig,
) -> EphemeraResult<Arc<dyn ImageCache>> {
    let cache: Arc<dyn ImageCache> = match cache_config.backend {
        CacheBackend::Redis if redis_config.enabled => {
            let pool = create_redis_pool(redis_config)?;
            Arc::new(
                RedisImageCache::new(pool, cache_config.key_prefix.clone(), cache_config.entry_ttl())
                    .with_operation_timeout(redis_config.timeout()),
            )
        }
        CacheBackend::Redis => {
            warn!("Redis cache selected but Redis is disabled; caching is off");
            Arc::new(RedisImageCache::disabled())
        }
        CacheBackend::Memory => Arc::new(MemoryImageCache::new(
            cache_config.max_entries,
            cache_config.entry_ttl(),
        )),
        CacheBackend::Disabled => Arc::new(RedisImageCache::disabled()),
    };

    info!(backend = %cache_config.backend, enabled = cache.is_enabled(), "Cache tier ready");
    Ok(cache)
}
