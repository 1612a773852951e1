//! Fail-open handling for tier operations on the read path.
//!
//! A tier failure during retrieval is never surfaced to the caller. Lookups
//! degrade to a miss and cleanups are attempted once and forgotten.

use crate::metrics::ImageMetrics;
use ephemera_core::EphemeraResult;
use tracing::warn;

/// Storage tier an operation ran against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tier {
    Cache,
    Store,
}

impl Tier {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Store => "store",
        }
    }
}

/// Treat a failed lookup as "not found in this tier".
pub(crate) fn degrade_to_miss<T>(
    tier: Tier,
    operation: &'static str,
    id: &str,
    result: EphemeraResult<Option<T>>,
) -> Option<T> {
    match result {
        Ok(found) => found,
        Err(e) => {
            ImageMetrics::tier_error(tier.as_str(), operation);
            warn!(tier = tier.as_str(), operation, id = %id, error = %e, "Lookup failed, treating as miss");
            None
        }
    }
}

/// Run a side effect whose failure must not change the outcome.
pub(crate) fn best_effort<T>(tier: Tier, operation: &'static str, id: &str, result: EphemeraResult<T>) {
    if let Err(e) = result {
        ImageMetrics::tier_error(tier.as_str(), operation);
        warn!(tier = tier.as_str(), operation, id = %id, error = %e, "Best-effort operation failed");
    }
}
