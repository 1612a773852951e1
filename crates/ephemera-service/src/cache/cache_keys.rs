//! Cache key generators for consistent key naming.

/// Default namespace for image entries in shared caches.
pub const DEFAULT_PREFIX: &str = "ephemera:image";

/// Generate the cache key for an image id under `prefix`.
#[must_use]
pub fn image_by_id(prefix: &str, id: &str) -> String {
    format!("{}:{}", prefix, id)
}
