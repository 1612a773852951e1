//! Result type aliases for Ephemera.

use crate::EphemeraError;

/// A specialized `Result` type for Ephemera operations.
pub type EphemeraResult<T> = Result<T, EphemeraError>;
