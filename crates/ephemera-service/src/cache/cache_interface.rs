//! Cache interface trait for the image tier.

use async_trait::async_trait;
use ephemera_core::{EphemeraResult, ImageRecord};

/// Fast cache holding copies of stored images.
///
/// Implementations report their failures as `EphemeraError::Cache`. Absence,
/// eviction and unavailability all look the same to the caller once the
/// service has degraded the error.
#[async_trait]
pub trait ImageCache: Send + Sync {
    /// Get a record from the cache.
    ///
    /// Returns `None` if the key was never stored or has been evicted.
    async fn get(&self, id: &str) -> EphemeraResult<Option<ImageRecord>>;

    /// Store a record under `id`.
    async fn set(&self, id: &str, record: &ImageRecord) -> EphemeraResult<()>;

    /// Delete a record from the cache.
    ///
    /// Returns `true` if the key existed and was deleted.
    async fn delete(&self, id: &str) -> EphemeraResult<bool>;

    /// Check if caching is enabled.
    fn is_enabled(&self) -> bool;

    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;
}
