//! Repository trait definitions.

use async_trait::async_trait;
use ephemera_core::{EphemeraResult, ImageRecord};

/// Authoritative image store.
///
/// Every failure is returned to the caller; deciding whether it is fatal is
/// the caller's job.
#[async_trait]
pub trait ImageRepository: Send + Sync {
    /// Inserts the record, replacing any record with the same id.
    async fn put(&self, record: &ImageRecord) -> EphemeraResult<()>;

    /// Finds the record whose id equals `id`.
    async fn find_by_id(&self, id: &str) -> EphemeraResult<Option<ImageRecord>>;

    /// Deletes every record whose id equals `id`. Missing ids are not an error.
    async fn delete_by_id(&self, id: &str) -> EphemeraResult<()>;
}
