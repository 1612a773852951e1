//! Prometheus metrics for image storage and retrieval.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

/// Metric names for the image service.
pub mod names {
    /// Lookups answered by the fast cache.
    pub const CACHE_HITS_TOTAL: &str = "ephemera_cache_hits_total";
    /// Lookups that fell through to the durable store.
    pub const CACHE_MISSES_TOTAL: &str = "ephemera_cache_misses_total";
    /// Lookups answered by the durable store.
    pub const STORE_HITS_TOTAL: &str = "ephemera_store_hits_total";
    /// Images accepted and persisted.
    pub const IMAGES_STORED_TOTAL: &str = "ephemera_images_stored_total";
    /// Expired images discovered and cleaned up on read.
    pub const IMAGES_EXPIRED_TOTAL: &str = "ephemera_images_expired_total";
    /// Tier operations that failed and were degraded or ignored.
    pub const TIER_ERRORS_TOTAL: &str = "ephemera_tier_errors_total";
    /// Time spent decoding and re-encoding uploads.
    pub const ENCODE_DURATION_SECONDS: &str = "ephemera_encode_duration_seconds";
}

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!(
        names::CACHE_HITS_TOTAL,
        "Total number of lookups served from the fast cache"
    );
    describe_counter!(
        names::CACHE_MISSES_TOTAL,
        "Total number of lookups that missed the fast cache"
    );
    describe_counter!(
        names::STORE_HITS_TOTAL,
        "Total number of lookups served from the durable store"
    );
    describe_counter!(
        names::IMAGES_STORED_TOTAL,
        "Total number of images stored"
    );
    describe_counter!(
        names::IMAGES_EXPIRED_TOTAL,
        "Total number of expired images removed on read"
    );
    describe_counter!(
        names::TIER_ERRORS_TOTAL,
        "Total number of storage tier errors, by tier"
    );
    describe_histogram!(
        names::ENCODE_DURATION_SECONDS,
        "Upload re-encoding duration in seconds"
    );
}

/// Image service metrics recorder.
#[derive(Clone)]
pub struct ImageMetrics;

impl ImageMetrics {
    /// Record a fast cache hit.
    pub fn cache_hit() {
        counter!(names::CACHE_HITS_TOTAL).increment(1);
    }

    /// Record a fast cache miss.
    pub fn cache_miss() {
        counter!(names::CACHE_MISSES_TOTAL).increment(1);
    }

    /// Record a durable store hit.
    pub fn store_hit() {
        counter!(names::STORE_HITS_TOTAL).increment(1);
    }

    /// Record a stored image.
    pub fn image_stored() {
        counter!(names::IMAGES_STORED_TOTAL).increment(1);
    }

    /// Record an expired image found on read.
    pub fn image_expired(tier: &'static str) {
        counter!(names::IMAGES_EXPIRED_TOTAL, "tier" => tier).increment(1);
    }

    /// Record a tier failure.
    pub fn tier_error(tier: &'static str, operation: &'static str) {
        counter!(
            names::TIER_ERRORS_TOTAL,
            "tier" => tier,
            "operation" => operation
        )
        .increment(1);
    }

    /// Record upload re-encoding time.
    pub fn encode_duration(duration: Duration) {
        histogram!(names::ENCODE_DURATION_SECONDS).record(duration.as_secs_f64());
    }
}
