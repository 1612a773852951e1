//! Image service trait.

use crate::codec::ImageUpload;
use async_trait::async_trait;
use ephemera_core::{EphemeraResult, ImageRecord};

/// Result of a retrieval.
///
/// Never-stored, expired and unreachable all collapse into `NotFound`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalOutcome {
    /// A live record.
    Found(ImageRecord),
    /// Nothing servable under the key.
    NotFound,
}

impl RetrievalOutcome {
    /// Returns `true` for `Found`.
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Extracts the record, if any.
    #[must_use]
    pub fn into_record(self) -> Option<ImageRecord> {
        match self {
            Self::Found(record) => Some(record),
            Self::NotFound => None,
        }
    }
}

/// Image service trait.
#[async_trait]
pub trait ImageService: Send + Sync {
    /// Re-encode an upload and store it, returning its retrieval key.
    ///
    /// Fails with `Decode` before touching either tier if the upload is not an
    /// image, or with an infrastructure error if the durable write fails.
    async fn store(&self, upload: ImageUpload) -> EphemeraResult<String>;

    /// Store an already-encoded payload, returning its retrieval key.
    async fn store_encoded(&self, payload: Vec<u8>) -> EphemeraResult<String>;

    /// Look up a key, enforcing expiry and cleaning up expired entries.
    ///
    /// Infallible: tier errors degrade to `NotFound`.
    async fn retrieve(&self, id: &str) -> RetrievalOutcome;
}
