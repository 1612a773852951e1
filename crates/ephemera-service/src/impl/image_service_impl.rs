//! Image service implementation.

use crate::cache::ImageCache;
use crate::codec::{ImageCodec, ImageUpload};
use crate::fail_open::{best_effort, degrade_to_miss, Tier};
use crate::image_service::{ImageService, RetrievalOutcome};
use crate::metrics::ImageMetrics;
use async_trait::async_trait;
use chrono::Duration;
use ephemera_config::ImageConfig;
use ephemera_core::{
    Clock, EphemeraError, EphemeraResult, ImageRecord, KeyGenerator, DEFAULT_IMAGE_TTL_SECS,
    KEY_LENGTH,
};
use ephemera_repository::ImageRepository;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Lifetime and key shape applied to new uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSettings {
    /// Time from upload to expiry.
    pub ttl: Duration,
    /// Length of generated keys.
    pub key_length: usize,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::seconds(DEFAULT_IMAGE_TTL_SECS as i64),
            key_length: KEY_LENGTH,
        }
    }
}

impl From<&ImageConfig> for ImageSettings {
    fn from(config: &ImageConfig) -> Self {
        Self {
            ttl: Duration::from_std(config.ttl()).unwrap_or_else(|_| Self::default().ttl),
            key_length: config.key_length,
        }
    }
}

/// Two-tier image service.
///
/// Writes go to the durable repository first and are mirrored to the cache on
/// a best-effort basis. Reads consult the cache, then the repository, and
/// delete whatever expired record they find.
pub struct ImageServiceImpl {
    repository: Arc<dyn ImageRepository>,
    cache: Arc<dyn ImageCache>,
    codec: Arc<dyn ImageCodec>,
    clock: Arc<dyn Clock>,
    keys: KeyGenerator,
    settings: ImageSettings,
}

impl ImageServiceImpl {
    /// Creates a new image service.
    pub fn new(
        repository: Arc<dyn ImageRepository>,
        cache: Arc<dyn ImageCache>,
        codec: Arc<dyn ImageCodec>,
        clock: Arc<dyn Clock>,
        keys: KeyGenerator,
        settings: ImageSettings,
    ) -> Self {
        Self {
            repository,
            cache,
            codec,
            clock,
            keys,
            settings,
        }
    }

    /// Remove an expired record from both tiers.
    async fn purge(&self, id: &str) {
        best_effort(Tier::Cache, "delete", id, self.cache.delete(id).await);
        best_effort(Tier::Store, "delete_by_id", id, self.repository.delete_by_id(id).await);
    }
}

#[async_trait]
impl ImageService for ImageServiceImpl {
    async fn store(&self, upload: ImageUpload) -> EphemeraResult<String> {
        debug!(upload = ?upload, "Storing upload");

        let codec = Arc::clone(&self.codec);
        let started = Instant::now();
        let payload = tokio::task::spawn_blocking(move || codec.reencode(&upload))
            .await
            .map_err(|e| EphemeraError::internal(format!("Encoding task failed: {}", e)))??;
        ImageMetrics::encode_duration(started.elapsed());

        self.store_encoded(payload).await
    }

    async fn store_encoded(&self, payload: Vec<u8>) -> EphemeraResult<String> {
        let id = self.keys.generate(self.settings.key_length);
        let record = ImageRecord::new(id.clone(), payload, self.clock.now(), self.settings.ttl);

        self.repository.put(&record).await.map_err(|e| {
            error!(error = %e, size = record.size(), "Failed to persist image");
            e
        })?;

        best_effort(Tier::Cache, "set", &id, self.cache.set(&id, &record).await);

        ImageMetrics::image_stored();
        info!(size = record.size(), expires_at = %record.expires_at, "Image stored");
        debug!(id = %id, "Issued key");
        Ok(id)
    }

    async fn retrieve(&self, id: &str) -> RetrievalOutcome {
        let now = self.clock.now();

        match degrade_to_miss(Tier::Cache, "get", id, self.cache.get(id).await) {
            Some(record) if record.is_live_at(now) => {
                ImageMetrics::cache_hit();
                debug!(id = %id, "Served from cache");
                return RetrievalOutcome::Found(record);
            }
            Some(record) => {
                ImageMetrics::image_expired(Tier::Cache.as_str());
                info!(id = %id, expired_at = %record.expires_at, "Expired image found in cache");
                self.purge(id).await;
                return RetrievalOutcome::NotFound;
            }
            None => ImageMetrics::cache_miss(),
        }

        match degrade_to_miss(Tier::Store, "find_by_id", id, self.repository.find_by_id(id).await) {
            Some(record) if record.is_live_at(now) => {
                ImageMetrics::store_hit();
                debug!(id = %id, "Served from store");
                RetrievalOutcome::Found(record)
            }
            Some(record) => {
                ImageMetrics::image_expired(Tier::Store.as_str());
                info!(id = %id, expired_at = %record.expires_at, "Expired image found in store");
                best_effort(Tier::Store, "delete_by_id", id, self.repository.delete_by_id(id).await);
                RetrievalOutcome::NotFound
            }
            None => {
                debug!(id = %id, "Image not found");
                RetrievalOutcome::NotFound
            }
        }
    }
}
