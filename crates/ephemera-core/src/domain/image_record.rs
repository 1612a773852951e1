//! Stored image entity.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default lifetime of an uploaded image, in seconds.
pub const DEFAULT_IMAGE_TTL_SECS: u64 = 5 * 60;

/// An uploaded image and the instant it stops being served.
///
/// Records are immutable once stored. The serialized shape keeps the payload
/// base64-encoded under `image` and the deadline under `expiration`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Re-encoded image bytes.
    #[serde(rename = "image", with = "base64_payload")]
    pub payload: Vec<u8>,
    /// Opaque lookup key.
    pub id: String,
    /// First instant at which the record is dead.
    #[serde(rename = "expiration")]
    pub expires_at: DateTime<Utc>,
}

impl ImageRecord {
    /// Creates a record that expires `ttl` after `now`.
    #[must_use]
    pub fn new(id: impl Into<String>, payload: Vec<u8>, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            payload,
            id: id.into(),
            expires_at: now + ttl,
        }
    }

    /// Live iff `now` is strictly before the expiration instant.
    #[must_use]
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Dead at or after the expiration instant.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_live_at(now)
    }

    /// Payload as standard base64, ready to embed in a data URI.
    #[must_use]
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.payload)
    }

    /// Payload size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.payload.len()
    }
}

// Payloads run to hundreds of kilobytes; keep them out of debug logs.
impl fmt::Debug for ImageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageRecord")
            .field("id", &self.id)
            .field("payload_len", &self.payload.len())
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

mod base64_payload {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
